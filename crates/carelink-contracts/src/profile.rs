//! Patient and volunteer profiles.
//!
//! Both are one-to-one companions of a `User` account: the account carries
//! identity and credentials, the profile carries the role-specific data and
//! the sequential display code (`MRN-…` for patients, `VHV-…` for
//! volunteers).  Deleting the account does not delete the profile — joins
//! simply resolve to absent on the next read.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::FormField;
use crate::map::GeoPoint;

/// Pregnancy sub-state carried by pregnant patients.
///
/// Presence of this record *is* the pregnancy flag; a profile cannot be
/// marked pregnant without its sub-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pregnancy {
    pub due_date: NaiveDate,
    pub gestational_week: u8,
}

/// Clinical snapshot and demographics for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: Uuid,
    /// The owning `User` account (role = patient).
    pub user_id: Uuid,
    /// Sequential `MRN-` display identifier, assigned once, never reused.
    pub medical_record_number: String,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    /// Category flag: needs close monitoring.
    #[serde(default)]
    pub critical: bool,
    /// Category flag: elderly patient.
    #[serde(default)]
    pub elderly: bool,
    /// Pregnancy flag plus sub-state; `None` when not pregnant.
    pub pregnancy: Option<Pregnancy>,
    pub assigned_doctor_id: Option<Uuid>,
    pub assigned_volunteer_id: Option<Uuid>,
    /// Village map area the patient lives in.
    pub map_area_id: Option<Uuid>,
    pub home_location: Option<GeoPoint>,
    /// Doctor-authored custom fields the patient answers in each daily record.
    #[serde(default)]
    pub daily_form: Vec<FormField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientProfile {
    /// True when the pregnancy sub-state is present.
    pub fn is_pregnant(&self) -> bool {
        self.pregnancy.is_some()
    }
}

/// Fields supplied when creating a patient profile.
///
/// `medical_record_number` may be supplied explicitly (imports, operational
/// backfills); when `None` the store assigns the next sequential code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatientProfile {
    pub user_id: Uuid,
    pub medical_record_number: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub elderly: bool,
    pub pregnancy: Option<Pregnancy>,
    pub assigned_doctor_id: Option<Uuid>,
    pub assigned_volunteer_id: Option<Uuid>,
    pub map_area_id: Option<Uuid>,
    pub home_location: Option<GeoPoint>,
    #[serde(default)]
    pub daily_form: Vec<FormField>,
}

/// Partial update for a patient profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientProfileUpdate {
    pub address: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub chronic_conditions: Option<Vec<String>>,
    pub critical: Option<bool>,
    pub elderly: Option<bool>,
    /// `Some(None)` clears the pregnancy sub-state; `Some(Some(_))` sets it.
    pub pregnancy: Option<Option<Pregnancy>>,
    pub assigned_doctor_id: Option<Option<Uuid>>,
    pub assigned_volunteer_id: Option<Option<Uuid>>,
    pub map_area_id: Option<Option<Uuid>>,
    pub home_location: Option<Option<GeoPoint>>,
    pub daily_form: Option<Vec<FormField>>,
}

impl PatientProfileUpdate {
    /// Merge the supplied fields over `profile`. The MRN and the owning user
    /// are immutable; timestamps are the store's job.
    pub fn apply(self, profile: &mut PatientProfile) {
        if let Some(address) = self.address {
            profile.address = Some(address);
        }
        if let Some(blood_type) = self.blood_type {
            profile.blood_type = Some(blood_type);
        }
        if let Some(allergies) = self.allergies {
            profile.allergies = allergies;
        }
        if let Some(conditions) = self.chronic_conditions {
            profile.chronic_conditions = conditions;
        }
        if let Some(critical) = self.critical {
            profile.critical = critical;
        }
        if let Some(elderly) = self.elderly {
            profile.elderly = elderly;
        }
        if let Some(pregnancy) = self.pregnancy {
            profile.pregnancy = pregnancy;
        }
        if let Some(doctor) = self.assigned_doctor_id {
            profile.assigned_doctor_id = doctor;
        }
        if let Some(volunteer) = self.assigned_volunteer_id {
            profile.assigned_volunteer_id = volunteer;
        }
        if let Some(area) = self.map_area_id {
            profile.map_area_id = area;
        }
        if let Some(location) = self.home_location {
            profile.home_location = location;
        }
        if let Some(form) = self.daily_form {
            profile.daily_form = form;
        }
    }
}

/// Assignment and location metadata for one village health volunteer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolunteerProfile {
    pub id: Uuid,
    /// The owning `User` account (role = volunteer).
    pub user_id: Uuid,
    /// Sequential `VHV-` display identifier, assigned once, never reused.
    pub volunteer_code: String,
    /// Map area this volunteer covers.
    pub map_area_id: Option<Uuid>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a volunteer profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVolunteerProfile {
    /// Explicit code for imports; `None` assigns the next sequential code.
    pub volunteer_code: Option<String>,
    pub map_area_id: Option<Uuid>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for a volunteer profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolunteerProfileUpdate {
    pub map_area_id: Option<Option<Uuid>>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl VolunteerProfileUpdate {
    /// Merge the supplied fields over `profile`.
    pub fn apply(self, profile: &mut VolunteerProfile) {
        if let Some(area) = self.map_area_id {
            profile.map_area_id = area;
        }
        if let Some(address) = self.address {
            profile.address = Some(address);
        }
        if let Some(notes) = self.notes {
            profile.notes = Some(notes);
        }
    }
}
