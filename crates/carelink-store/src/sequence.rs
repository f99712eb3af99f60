//! Sequential display-code assignment.
//!
//! Patients, volunteers, and doctors carry human-facing codes (`MRN-000001`,
//! `VHV-0001`, `DOC-0001`): monotonically increasing, zero-padded, and never
//! reused — including when the highest-numbered record is deleted.
//!
//! The counters are persisted high-water marks.  At hydration each mark is
//! reconciled against a full table scan (`max(stored mark, highest suffix in
//! the table)`), so stores opened over data written before the marks existed
//! continue the sequence correctly.  Creates may supply an explicit code
//! (imports, operational backfills); `cover` bumps the mark past it.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Prefix and zero-pad width for patient medical record numbers.
pub const MRN_PREFIX: &str = "MRN-";
/// Prefix and zero-pad width for volunteer codes.
pub const VHV_PREFIX: &str = "VHV-";
/// Prefix and zero-pad width for doctor codes.
pub const DOC_PREFIX: &str = "DOC-";

/// Persisted per-prefix high-water marks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceCounters {
    #[serde(default)]
    pub mrn: u32,
    #[serde(default)]
    pub volunteer: u32,
    #[serde(default)]
    pub doctor: u32,
}

impl SequenceCounters {
    /// Assign the next medical record number.
    pub fn next_mrn(&mut self) -> String {
        self.mrn += 1;
        format!("{MRN_PREFIX}{:06}", self.mrn)
    }

    /// Assign the next volunteer code.
    pub fn next_volunteer_code(&mut self) -> String {
        self.volunteer += 1;
        format!("{VHV_PREFIX}{:04}", self.volunteer)
    }

    /// Assign the next doctor code.
    pub fn next_doctor_code(&mut self) -> String {
        self.doctor += 1;
        format!("{DOC_PREFIX}{:04}", self.doctor)
    }

    /// Bump the MRN mark to cover an explicitly supplied code.
    pub fn cover_mrn(&mut self, code: &str) {
        if let Some(n) = code_suffix(code, MRN_PREFIX) {
            self.mrn = self.mrn.max(n);
        }
    }

    /// Bump the volunteer mark to cover an explicitly supplied code.
    pub fn cover_volunteer_code(&mut self, code: &str) {
        if let Some(n) = code_suffix(code, VHV_PREFIX) {
            self.volunteer = self.volunteer.max(n);
        }
    }

    /// Bump the doctor mark to cover an explicitly supplied code.
    pub fn cover_doctor_code(&mut self, code: &str) {
        if let Some(n) = code_suffix(code, DOC_PREFIX) {
            self.doctor = self.doctor.max(n);
        }
    }

    /// Reconcile every mark against the codes actually present in `data`.
    ///
    /// Run once at hydration. Marks only ever move up, so a table missing
    /// its highest-numbered record (deleted before this open) does not make
    /// the sequence reuse its code.
    pub fn reconcile(&mut self, data: &Dataset) {
        for profile in &data.patient_profiles {
            self.cover_mrn(&profile.medical_record_number);
        }
        for profile in &data.volunteer_profiles {
            self.cover_volunteer_code(&profile.volunteer_code);
        }
        for user in &data.users {
            if let Some(code) = &user.doctor_code {
                self.cover_doctor_code(code);
            }
        }
    }
}

/// The numeric suffix of `code` under `prefix`, or `None` when the code does
/// not belong to that sequence.
fn code_suffix(code: &str, prefix: &str) -> Option<u32> {
    code.strip_prefix(prefix)?.parse().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
