//! Clinical entries: patient daily records and doctor visit notes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Patient-reported vital signs, captured as free text.
///
/// The portal never forces units or formats on patients; the triage layer
/// extracts the first numeric token from each field and applies thresholds.
/// Unparseable text simply produces no flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Body temperature, °C or °F (values below 50 are treated as °C).
    pub temperature: Option<String>,
    /// Pulse in beats per minute.
    pub pulse: Option<String>,
    /// Blood pressure as "systolic/diastolic" free text.
    pub blood_pressure: Option<String>,
    /// Blood sugar in mg/dL.
    pub blood_sugar: Option<String>,
    /// SpO₂ percentage.
    pub oxygen_saturation: Option<String>,
    /// Self-reported pain, 0–10.
    pub pain_level: Option<String>,
    /// Self-reported fatigue, 0–10.
    pub fatigue_level: Option<String>,
}

/// One patient-submitted daily record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub id: Uuid,
    /// The `PatientProfile` this record belongs to.
    pub patient_id: Uuid,
    pub record_date: NaiveDate,
    #[serde(default)]
    pub vitals: Vitals,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    /// Responses to the profile's doctor-authored daily form.
    #[serde(default)]
    pub custom_responses: Map<String, Value>,
    /// Doctor-authored follow-up instructions added after review.
    pub doctor_instructions: Option<String>,
    /// Human-readable triage flags produced at submission time.
    #[serde(default)]
    pub flags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a daily record.
///
/// `flags` is filled by the triage layer before the record is stored; direct
/// store callers leave it empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDailyRecord {
    pub patient_id: Uuid,
    pub record_date: NaiveDate,
    #[serde(default)]
    pub vitals: Vitals,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub custom_responses: Map<String, Value>,
    #[serde(default)]
    pub flags: Vec<String>,
}

/// Partial update for a daily record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyRecordUpdate {
    pub symptoms: Option<String>,
    pub notes: Option<String>,
    pub doctor_instructions: Option<String>,
}

impl DailyRecordUpdate {
    /// Merge the supplied fields over `record`.
    pub fn apply(self, record: &mut DailyRecord) {
        if let Some(symptoms) = self.symptoms {
            record.symptoms = Some(symptoms);
        }
        if let Some(notes) = self.notes {
            record.notes = Some(notes);
        }
        if let Some(instructions) = self.doctor_instructions {
            record.doctor_instructions = Some(instructions);
        }
    }
}

/// One doctor-authored visit note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: Uuid,
    /// The `PatientProfile` this note is about.
    pub patient_id: Uuid,
    /// Authoring doctor's user id.
    pub doctor_id: Uuid,
    pub visit_date: NaiveDate,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a visit note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDoctorRecord {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub visit_date: NaiveDate,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

/// Partial update for a visit note. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorRecordUpdate {
    pub visit_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub follow_up_date: Option<Option<NaiveDate>>,
}

impl DoctorRecordUpdate {
    /// Merge the supplied fields over `record`.
    pub fn apply(self, record: &mut DoctorRecord) {
        if let Some(visit_date) = self.visit_date {
            record.visit_date = visit_date;
        }
        if let Some(diagnosis) = self.diagnosis {
            record.diagnosis = diagnosis;
        }
        if let Some(treatment) = self.treatment {
            record.treatment = Some(treatment);
        }
        if let Some(notes) = self.notes {
            record.notes = Some(notes);
        }
        if let Some(follow_up) = self.follow_up_date {
            record.follow_up_date = follow_up;
        }
    }
}
