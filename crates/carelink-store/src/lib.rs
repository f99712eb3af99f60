//! # carelink-store
//!
//! The carelink record store: single source of truth for every entity type
//! of the coordination portal, with an injected durable-persistence boundary.
//!
//! Construction is explicit — `RecordStore::open(backend, defaults)` — and
//! every mutation persists the entire affected table through the
//! `StorageBackend`.  Reads see only the in-memory mirror hydrated at open,
//! and joined views are computed fresh per read.
//!
//! The per-entity operation surface lives in the `ops` modules; the
//! supporting pieces are:
//!
//! - [`backend`] — the `StorageBackend` trait plus memory and file backends.
//! - [`dataset`] — the full set of entity tables (also the injectable
//!   default contents).
//! - [`sequence`] — sequential display-code assignment (`MRN-…`, `VHV-…`,
//!   `DOC-…`).
//! - [`views`] — denormalized read-view structs.

pub mod backend;
pub mod dataset;
pub mod ops;
pub mod sequence;
pub mod store;
pub mod views;

pub use backend::{keys, JsonFileBackend, MemoryBackend, StorageBackend};
pub use dataset::Dataset;
pub use store::{HydrationReport, RecordStore};

// ── Shared test fixtures ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use carelink_contracts::profile::NewPatientProfile;
    use carelink_contracts::task::{NewTask, Priority, TaskKind};
    use carelink_contracts::user::{NewUser, Role};

    use crate::backend::MemoryBackend;
    use crate::dataset::Dataset;
    use crate::store::RecordStore;

    /// An empty store over a throwaway memory backend.
    pub(crate) fn open_store() -> RecordStore {
        RecordStore::open(MemoryBackend::new(), Dataset::default())
            .unwrap()
            .0
    }

    pub(crate) fn new_user(role: Role, name: &str, email: &str) -> NewUser {
        NewUser {
            role,
            name: name.to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
            photo_url: None,
            phone: None,
            date_of_birth: None,
        }
    }

    pub(crate) fn new_patient(user_id: Uuid) -> NewPatientProfile {
        NewPatientProfile {
            user_id,
            medical_record_number: None,
            address: None,
            blood_type: None,
            allergies: Vec::new(),
            chronic_conditions: Vec::new(),
            critical: false,
            elderly: false,
            pregnancy: None,
            assigned_doctor_id: None,
            assigned_volunteer_id: None,
            map_area_id: None,
            home_location: None,
            daily_form: Vec::new(),
        }
    }

    pub(crate) fn new_todo(assigned_to: Uuid, assigned_by: Uuid, title: &str) -> NewTask {
        NewTask {
            kind: TaskKind::Todo,
            title: title.to_string(),
            description: None,
            priority: Priority::Medium,
            assigned_to,
            assigned_by,
            form_fields: Vec::new(),
        }
    }

    pub(crate) fn new_appointment(
        assigned_to: Uuid,
        assigned_by: Uuid,
        patient_id: Uuid,
        title: &str,
        day: u32,
    ) -> NewTask {
        NewTask {
            kind: TaskKind::Appointment {
                patient_id,
                scheduled_at: Utc.with_ymd_and_hms(2026, 9, day, 9, 0, 0).unwrap(),
            },
            title: title.to_string(),
            description: None,
            priority: Priority::High,
            assigned_to,
            assigned_by,
            form_fields: Vec::new(),
        }
    }
}
