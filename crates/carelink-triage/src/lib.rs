//! # carelink-triage
//!
//! Derived clinical logic layered above the record store:
//!
//! - [`thresholds`] — TOML-configurable vital-sign thresholds.
//! - [`vitals`] — free-text vital-sign extraction and threshold evaluation.
//! - [`alerts`] — daily-record and PHQ-9 submission with alert dispatch
//!   (volunteer message, follow-up appointment, doctor FYI).
//! - [`reminders`] — the medication reminder sweep with per-day dedupe.
//!
//! Nothing here persists on its own; every effect goes through
//! `carelink_store::RecordStore`.

pub mod alerts;
pub mod reminders;
pub mod thresholds;
pub mod vitals;

pub use alerts::{submit_assessment, submit_daily_record, AlertOutcome};
pub use reminders::run_reminder_sweep;
pub use thresholds::TriageThresholds;
pub use vitals::{evaluate_vitals, VitalsReview};

// ── Shared test fixtures ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::NaiveDate;
    use serde_json::Map;
    use uuid::Uuid;

    use carelink_contracts::clinical::{NewDailyRecord, Vitals};
    use carelink_contracts::profile::{NewPatientProfile, NewVolunteerProfile, PatientProfile};
    use carelink_contracts::user::{NewUser, Role, User};

    use carelink_store::{Dataset, MemoryBackend, RecordStore};

    /// An empty store over a throwaway memory backend.
    pub(crate) fn open_store() -> RecordStore {
        RecordStore::open(MemoryBackend::new(), Dataset::default())
            .unwrap()
            .0
    }

    pub(crate) struct CareTeam {
        pub doctor: User,
        pub volunteer: User,
        pub patient_user: User,
        pub patient: PatientProfile,
    }

    fn new_user(role: Role, name: &str, email: &str) -> NewUser {
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

    /// One doctor, one volunteer, and one fully assigned patient.
    pub(crate) fn care_team(store: &RecordStore) -> CareTeam {
        let doctor = store
            .create_doctor(new_user(Role::Doctor, "Dr. Somchai", "somchai@example.org"))
            .unwrap();
        let (volunteer, _) = store
            .create_volunteer(
                new_user(Role::Volunteer, "Nok", "nok@example.org"),
                NewVolunteerProfile::default(),
            )
            .unwrap();
        let patient_user = store
            .sign_up(new_user(Role::Patient, "Mali", "mali@example.org"))
            .unwrap();
        let patient = store
            .create_patient(NewPatientProfile {
                user_id: patient_user.id,
                medical_record_number: None,
                address: None,
                blood_type: None,
                allergies: Vec::new(),
                chronic_conditions: Vec::new(),
                critical: false,
                elderly: false,
                pregnancy: None,
                assigned_doctor_id: Some(doctor.id),
                assigned_volunteer_id: Some(volunteer.id),
                map_area_id: None,
                home_location: None,
                daily_form: Vec::new(),
            })
            .unwrap();

        CareTeam {
            doctor,
            volunteer,
            patient_user,
            patient,
        }
    }

    pub(crate) fn daily_record(patient_id: Uuid, vitals: Vitals) -> NewDailyRecord {
        NewDailyRecord {
            patient_id,
            record_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            vitals,
            symptoms: None,
            notes: None,
            custom_responses: Map::new(),
            flags: Vec::new(),
        }
    }
}
