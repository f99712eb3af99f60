//! Medications, intake logs, and the request/approval workflow.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::{hhmm_list, hhmm_list_opt, hhmm_opt};

/// A prescribed medication with its daily schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    /// The `PatientProfile` this prescription belongs to.
    pub patient_id: Uuid,
    /// Prescribing doctor's user id.
    pub prescribed_by: Uuid,
    pub name: String,
    pub dosage: String,
    pub instructions: Option<String>,
    /// Daily wall-clock slots in `HH:MM` form.
    #[serde(with = "hhmm_list")]
    pub schedule: Vec<NaiveTime>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Inactive medications are kept for history but drop out of schedule
    /// views and the reminder sweep.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medication {
    /// True when the medication is active and `date` falls inside its
    /// prescription window.
    pub fn in_effect_on(&self, date: NaiveDate) -> bool {
        self.active
            && self.start_date <= date
            && self.end_date.map_or(true, |end| date <= end)
    }
}

/// Fields supplied when prescribing a medication. `active` starts true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedication {
    pub patient_id: Uuid,
    pub prescribed_by: Uuid,
    pub name: String,
    pub dosage: String,
    pub instructions: Option<String>,
    #[serde(with = "hhmm_list")]
    pub schedule: Vec<NaiveTime>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Partial update for a medication. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicationUpdate {
    pub dosage: Option<String>,
    pub instructions: Option<String>,
    #[serde(default, with = "hhmm_list_opt")]
    pub schedule: Option<Vec<NaiveTime>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub active: Option<bool>,
}

impl MedicationUpdate {
    /// Merge the supplied fields over `medication`. The patient linkage and
    /// prescription identity are immutable.
    pub fn apply(self, medication: &mut Medication) {
        if let Some(dosage) = self.dosage {
            medication.dosage = dosage;
        }
        if let Some(instructions) = self.instructions {
            medication.instructions = Some(instructions);
        }
        if let Some(schedule) = self.schedule {
            medication.schedule = schedule;
        }
        if let Some(end_date) = self.end_date {
            medication.end_date = end_date;
        }
        if let Some(active) = self.active {
            medication.active = active;
        }
    }
}

/// One logged dose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationIntake {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub taken_at: DateTime<Utc>,
    /// The schedule slot this dose satisfies, when the patient picked one.
    #[serde(default, with = "hhmm_opt")]
    pub schedule_slot: Option<NaiveTime>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when logging a dose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedicationIntake {
    pub medication_id: Uuid,
    pub taken_at: DateTime<Utc>,
    #[serde(default, with = "hhmm_opt")]
    pub schedule_slot: Option<NaiveTime>,
    pub notes: Option<String>,
}

/// Medication request workflow status.
///
/// Legal transitions: `Pending → Approved | Declined`, `Approved →
/// Fulfilled`.  The store rejects everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Declined,
    Fulfilled,
}

impl RequestStatus {
    /// Display label used in messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Declined => "declined",
            RequestStatus::Fulfilled => "fulfilled",
        }
    }
}

/// A patient's request for a medication, reviewed by a doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationRequest {
    pub id: Uuid,
    /// Requesting patient's `PatientProfile`.
    pub patient_id: Uuid,
    pub medication_name: String,
    pub reason: Option<String>,
    pub status: RequestStatus,
    /// Reviewing doctor's user id, stamped at review time.
    pub reviewed_by: Option<Uuid>,
    pub review_note: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub fulfilled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when filing a request. Status starts at `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedicationRequest {
    pub patient_id: Uuid,
    pub medication_name: String,
    pub reason: Option<String>,
}
