//! Denormalized read views.
//!
//! Every list/get operation that crosses an entity reference returns one of
//! these: the record plus the *current* state of whatever it references,
//! looked up fresh at read time.  Views are never persisted, and a dangling
//! reference (the referenced record was deleted) resolves to `None` rather
//! than erroring.

use serde::Serialize;

use carelink_contracts::assessment::MentalAssessment;
use carelink_contracts::clinical::{DailyRecord, DoctorRecord};
use carelink_contracts::map::MapArea;
use carelink_contracts::medication::{Medication, MedicationRequest};
use carelink_contracts::message::{Announcement, Message};
use carelink_contracts::profile::{PatientProfile, VolunteerProfile};
use carelink_contracts::task::Task;
use carelink_contracts::user::User;

/// A patient profile joined with its account and care-team assignments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientView {
    pub profile: PatientProfile,
    /// The owning account; `None` when the account was deleted.
    pub user: Option<User>,
    pub assigned_doctor: Option<User>,
    pub assigned_volunteer: Option<User>,
}

/// A volunteer profile joined with its account and coverage area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolunteerView {
    pub profile: VolunteerProfile,
    pub user: Option<User>,
    pub area: Option<MapArea>,
}

/// A task joined with the people and patient it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub task: Task,
    pub assigned_to_user: Option<User>,
    pub assigned_by_user: Option<User>,
    /// The linked patient profile, for appointments.
    pub patient: Option<PatientProfile>,
}

/// A message joined with both ends of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub message: Message,
    pub sender: Option<User>,
    pub recipient: Option<User>,
}

/// An announcement joined with its author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnouncementView {
    pub announcement: Announcement,
    pub author: Option<User>,
}

/// A daily record joined with the patient it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecordView {
    pub record: DailyRecord,
    pub patient: Option<PatientProfile>,
}

/// A visit note joined with its author and patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorRecordView {
    pub record: DoctorRecord,
    pub doctor: Option<User>,
    pub patient: Option<PatientProfile>,
}

/// A medication joined with its patient and prescriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationView {
    pub medication: Medication,
    pub patient: Option<PatientProfile>,
    pub prescriber: Option<User>,
}

/// A medication request joined with its patient and reviewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationRequestView {
    pub request: MedicationRequest,
    pub patient: Option<PatientProfile>,
    pub reviewer: Option<User>,
}

/// An assessment joined with the patient it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentView {
    pub assessment: MentalAssessment,
    pub patient: Option<PatientProfile>,
}
