//! Tasks and appointments.
//!
//! An appointment is not a to-do with extra fields: the kind is an explicit
//! tagged variant, so an appointment without a schedule or a patient-linked
//! general to-do is unrepresentable and no reader has to re-derive the
//! distinction from which optional fields happen to be set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::form::FormField;

/// Shared priority scale for tasks and announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// What a task *is*: a general to-do or a patient appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    /// A general work item with no patient linkage.
    Todo,
    /// A scheduled visit for one patient.
    Appointment {
        /// The `PatientProfile` this appointment is for.
        patient_id: Uuid,
        scheduled_at: DateTime<Utc>,
    },
}

impl TaskKind {
    /// The linked patient profile, when this is an appointment.
    pub fn patient_id(&self) -> Option<Uuid> {
        match self {
            TaskKind::Todo => None,
            TaskKind::Appointment { patient_id, .. } => Some(*patient_id),
        }
    }

    /// The scheduled time, when this is an appointment.
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        match self {
            TaskKind::Todo => None,
            TaskKind::Appointment { scheduled_at, .. } => Some(*scheduled_at),
        }
    }
}

/// Task status machine.
///
/// Any status may move to any other; the store stamps `completed_at` on the
/// transition into `Completed` and refuses `Completed` without a non-empty
/// report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// A work item or appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: TaskKind,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    /// The user who must do the work.
    pub assigned_to: Uuid,
    /// The user who created the assignment.
    pub assigned_by: Uuid,
    /// Doctor-authored dynamic form the assignee fills in, if any.
    #[serde(default)]
    pub form_fields: Vec<FormField>,
    /// Validated responses to `form_fields`, keyed by field name.
    pub form_responses: Option<Map<String, Value>>,
    /// Free-text completion report. Required before the task can be completed.
    pub report: Option<String>,
    /// Stamped on the transition into `Completed`; untouched when the status
    /// is re-asserted.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// True when the task carries a non-empty report.
    pub fn has_report(&self) -> bool {
        self.report.as_deref().is_some_and(|r| !r.trim().is_empty())
    }
}

/// Fields supplied when creating a task. Status starts at `Pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub kind: TaskKind,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub assigned_to: Uuid,
    pub assigned_by: Uuid,
    #[serde(default)]
    pub form_fields: Vec<FormField>,
}

/// Partial update for a task. `None` fields are left untouched.
///
/// The kind tag is immutable; `scheduled_at` reschedules an appointment and
/// is rejected for a to-do.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assigned_to: Option<Uuid>,
    pub report: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}
