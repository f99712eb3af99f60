//! # carelink-contracts
//!
//! Shared entity types, identifiers, and error contracts for the carelink
//! record store.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, partial-update merges, and error
//! types.

pub mod assessment;
pub mod clinical;
pub mod error;
pub mod form;
pub mod map;
pub mod medication;
pub mod message;
pub mod profile;
pub mod session;
pub mod task;
pub mod time;
pub mod user;

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use crate::assessment::Severity;
    use crate::error::StoreError;
    use crate::form::{FieldKind, FormField};
    use crate::session::Session;
    use crate::task::{Priority, Task, TaskKind, TaskStatus};
    use crate::user::{Role, User};

    // ── Severity buckets ─────────────────────────────────────────────────────

    #[test]
    fn severity_buckets_at_standard_cutoffs() {
        assert_eq!(Severity::from_total(0), Severity::Minimal);
        assert_eq!(Severity::from_total(4), Severity::Minimal);
        assert_eq!(Severity::from_total(5), Severity::Mild);
        assert_eq!(Severity::from_total(9), Severity::Mild);
        assert_eq!(Severity::from_total(10), Severity::Moderate);
        assert_eq!(Severity::from_total(14), Severity::Moderate);
        assert_eq!(Severity::from_total(15), Severity::ModeratelySevere);
        assert_eq!(Severity::from_total(19), Severity::ModeratelySevere);
        assert_eq!(Severity::from_total(20), Severity::Severe);
        assert_eq!(Severity::from_total(27), Severity::Severe);
    }

    #[test]
    fn severity_ordering_matches_clinical_escalation() {
        assert!(Severity::Minimal < Severity::Mild);
        assert!(Severity::Moderate < Severity::ModeratelySevere);
        assert!(Severity::ModeratelySevere < Severity::Severe);
    }

    // ── Task kind wire form ──────────────────────────────────────────────────

    fn make_task(kind: TaskKind) -> Task {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        Task {
            id: Uuid::new_v4(),
            kind,
            title: "check in".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            assigned_to: Uuid::new_v4(),
            assigned_by: Uuid::new_v4(),
            form_fields: Vec::new(),
            form_responses: None,
            report: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn todo_task_serializes_with_flat_kind_tag() {
        let task = make_task(TaskKind::Todo);
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["kind"], json!("todo"));
        assert!(value.get("patient_id").is_none());

        let decoded: Task = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn appointment_task_round_trips_with_patient_and_schedule() {
        let patient_id = Uuid::new_v4();
        let scheduled_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let task = make_task(TaskKind::Appointment {
            patient_id,
            scheduled_at,
        });

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["kind"], json!("appointment"));

        let decoded: Task = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.kind.patient_id(), Some(patient_id));
        assert_eq!(decoded.kind.scheduled_at(), Some(scheduled_at));
    }

    // ── Form field wire form ─────────────────────────────────────────────────

    #[test]
    fn select_field_round_trips_with_options() {
        let field = FormField::required(
            "mood",
            "How is your mood today?",
            FieldKind::Select {
                options: vec!["good".to_string(), "okay".to_string(), "low".to_string()],
            },
        );

        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["kind"], json!("select"));
        assert_eq!(value["options"], json!(["good", "okay", "low"]));

        let decoded: FormField = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, field);
    }

    // ── Session expiry ───────────────────────────────────────────────────────

    #[test]
    fn session_expiry_is_inclusive_at_the_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let user = User {
            id: Uuid::new_v4(),
            role: Role::Patient,
            name: "Test".to_string(),
            email: "t@example.org".to_string(),
            password: "pw".to_string(),
            photo_url: None,
            phone: None,
            date_of_birth: None,
            doctor_code: None,
            created_at: now,
            updated_at: now,
        };
        let session = Session {
            user,
            token: "deadbeef".to_string(),
            expires_at: now + Duration::hours(24),
        };

        assert!(!session.is_expired_at(now));
        assert!(!session.is_expired_at(now + Duration::hours(24) - Duration::seconds(1)));
        assert!(session.is_expired_at(now + Duration::hours(24)));
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_not_found_display() {
        let err = StoreError::not_found("patient profile", "abc-123");
        let msg = err.to_string();
        assert!(msg.contains("patient profile"));
        assert!(msg.contains("abc-123"));
        assert!(err.is_not_found());
    }

    #[test]
    fn error_validation_display() {
        let err = StoreError::validation("email already registered");
        let msg = err.to_string();
        assert!(msg.contains("validation failed"));
        assert!(msg.contains("email already registered"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn error_storage_display() {
        let err = StoreError::storage("disk full");
        let msg = err.to_string();
        assert!(msg.contains("storage backend error"));
        assert!(msg.contains("disk full"));
    }
}
