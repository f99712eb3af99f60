//! The full set of entity tables.
//!
//! A `Dataset` is both the in-memory mirror the store operates on and the
//! injectable default contents used when a persisted key is absent or fails
//! to decode (the seed crate builds one).

use carelink_contracts::assessment::MentalAssessment;
use carelink_contracts::clinical::{DailyRecord, DoctorRecord};
use carelink_contracts::map::{MapArea, MapLocation};
use carelink_contracts::medication::{Medication, MedicationIntake, MedicationRequest};
use carelink_contracts::message::{Announcement, Message};
use carelink_contracts::profile::{PatientProfile, VolunteerProfile};
use carelink_contracts::task::Task;
use carelink_contracts::user::User;

/// Every entity table, in one place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub users: Vec<User>,
    pub patient_profiles: Vec<PatientProfile>,
    pub volunteer_profiles: Vec<VolunteerProfile>,
    pub tasks: Vec<Task>,
    pub messages: Vec<Message>,
    pub announcements: Vec<Announcement>,
    pub daily_records: Vec<DailyRecord>,
    pub doctor_records: Vec<DoctorRecord>,
    pub medications: Vec<Medication>,
    pub medication_intakes: Vec<MedicationIntake>,
    pub medication_requests: Vec<MedicationRequest>,
    pub mental_assessments: Vec<MentalAssessment>,
    pub map_areas: Vec<MapArea>,
    pub map_locations: Vec<MapLocation>,
}

impl Dataset {
    /// Total row count across all tables, for logs and the demo banner.
    pub fn row_count(&self) -> usize {
        self.users.len()
            + self.patient_profiles.len()
            + self.volunteer_profiles.len()
            + self.tasks.len()
            + self.messages.len()
            + self.announcements.len()
            + self.daily_records.len()
            + self.doctor_records.len()
            + self.medications.len()
            + self.medication_intakes.len()
            + self.medication_requests.len()
            + self.mental_assessments.len()
            + self.map_areas.len()
            + self.map_locations.len()
    }
}
