//! The record store: construction, hydration, and the persistence rhythm.
//!
//! `RecordStore` is an explicitly constructed service object — no
//! module-load global state.  `open` hydrates every table from the injected
//! `StorageBackend` exactly once; after that, reads see only the in-memory
//! mirror and every mutation writes the *entire* affected table back through
//! the backend.
//!
//! Hydration failure semantics: a persisted payload that fails typed
//! decoding falls back to that table's injected default rows, but the
//! fallback is surfaced — a WARN names the key and the decode error, and the
//! recovered keys are reported in the `HydrationReport`.  Backend I/O
//! failures are real errors.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use carelink_contracts::error::{StoreError, StoreResult};
use carelink_contracts::map::MapArea;
use carelink_contracts::profile::PatientProfile;
use carelink_contracts::session::{Session, UiPrefs};
use carelink_contracts::user::User;

use crate::backend::{keys, StorageBackend};
use crate::dataset::Dataset;
use crate::sequence::SequenceCounters;

// ── Hydration report ──────────────────────────────────────────────────────────

/// What hydration had to recover from.
///
/// An empty report means every persisted key decoded cleanly (or was simply
/// absent, which is the normal first-open case).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydrationReport {
    /// Keys whose persisted payload failed to decode and fell back to the
    /// injected defaults.
    pub recovered_keys: Vec<&'static str>,
    /// True when a persisted session was cleared (malformed or expired).
    pub session_cleared: bool,
}

impl HydrationReport {
    /// True when nothing needed recovery.
    pub fn is_clean(&self) -> bool {
        self.recovered_keys.is_empty() && !self.session_cleared
    }
}

// ── Internal state ────────────────────────────────────────────────────────────

/// The mutable interior of a `RecordStore`, behind one `Mutex`.
pub(crate) struct State {
    pub(crate) data: Dataset,
    pub(crate) session: Option<Session>,
    pub(crate) prefs: UiPrefs,
    pub(crate) sequences: SequenceCounters,
}

impl State {
    pub(crate) fn user_by_id(&self, id: Uuid) -> Option<User> {
        self.data.users.iter().find(|u| u.id == id).cloned()
    }

    pub(crate) fn patient_by_id(&self, id: Uuid) -> Option<PatientProfile> {
        self.data.patient_profiles.iter().find(|p| p.id == id).cloned()
    }

    pub(crate) fn area_by_id(&self, id: Uuid) -> Option<MapArea> {
        self.data.map_areas.iter().find(|a| a.id == id).cloned()
    }
}

// ── The store ─────────────────────────────────────────────────────────────────

/// Single source of truth for every entity type.
///
/// All operations are synchronous methods; per-entity CRUD and read views
/// live in the `ops` modules as further `impl RecordStore` blocks.
pub struct RecordStore {
    backend: Box<dyn StorageBackend>,
    state: Mutex<State>,
}

impl RecordStore {
    /// Hydrate a store from `backend`, using `defaults` for any table whose
    /// key is absent or fails to decode.
    pub fn open(
        backend: impl StorageBackend + 'static,
        defaults: Dataset,
    ) -> StoreResult<(Self, HydrationReport)> {
        let mut report = HydrationReport::default();

        let data = Dataset {
            users: hydrate_table(&backend, keys::USERS, defaults.users, &mut report)?,
            patient_profiles: hydrate_table(
                &backend,
                keys::PATIENT_PROFILES,
                defaults.patient_profiles,
                &mut report,
            )?,
            volunteer_profiles: hydrate_table(
                &backend,
                keys::VOLUNTEER_PROFILES,
                defaults.volunteer_profiles,
                &mut report,
            )?,
            tasks: hydrate_table(&backend, keys::TASKS, defaults.tasks, &mut report)?,
            messages: hydrate_table(&backend, keys::MESSAGES, defaults.messages, &mut report)?,
            announcements: hydrate_table(
                &backend,
                keys::ANNOUNCEMENTS,
                defaults.announcements,
                &mut report,
            )?,
            daily_records: hydrate_table(
                &backend,
                keys::DAILY_RECORDS,
                defaults.daily_records,
                &mut report,
            )?,
            doctor_records: hydrate_table(
                &backend,
                keys::DOCTOR_RECORDS,
                defaults.doctor_records,
                &mut report,
            )?,
            medications: hydrate_table(
                &backend,
                keys::MEDICATIONS,
                defaults.medications,
                &mut report,
            )?,
            medication_intakes: hydrate_table(
                &backend,
                keys::MEDICATION_INTAKES,
                defaults.medication_intakes,
                &mut report,
            )?,
            medication_requests: hydrate_table(
                &backend,
                keys::MEDICATION_REQUESTS,
                defaults.medication_requests,
                &mut report,
            )?,
            mental_assessments: hydrate_table(
                &backend,
                keys::MENTAL_ASSESSMENTS,
                defaults.mental_assessments,
                &mut report,
            )?,
            map_areas: hydrate_table(&backend, keys::MAP_AREAS, defaults.map_areas, &mut report)?,
            map_locations: hydrate_table(
                &backend,
                keys::MAP_LOCATIONS,
                defaults.map_locations,
                &mut report,
            )?,
        };

        let session = hydrate_session(&backend, &mut report)?;
        let prefs = hydrate_singular(&backend, keys::UI_PREFS, UiPrefs::default(), &mut report)?;
        let mut sequences = hydrate_singular(
            &backend,
            keys::SEQUENCES,
            SequenceCounters::default(),
            &mut report,
        )?;
        sequences.reconcile(&data);

        info!(
            rows = data.row_count(),
            recovered = report.recovered_keys.len(),
            session_cleared = report.session_cleared,
            "record store opened"
        );

        let store = Self {
            backend: Box::new(backend),
            state: Mutex::new(State {
                data,
                session,
                prefs,
                sequences,
            }),
        };
        Ok((store, report))
    }

    /// Lock the in-memory state.
    ///
    /// A poisoned lock means a panic elsewhere while the guard was held;
    /// every mutation finishes its in-memory step before persisting, so the
    /// tables are still internally consistent and operation may continue.
    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Serialize `table` and write it under `key` — the whole table, never a
    /// delta.
    pub(crate) fn persist<T: Serialize>(&self, key: &'static str, table: &T) -> StoreResult<()> {
        let document = serde_json::to_string(table)
            .map_err(|e| StoreError::storage(format!("failed to encode '{key}': {e}")))?;
        self.backend.store(key, &document)
    }

    /// Remove the document under `key` from the backend.
    pub(crate) fn remove_persisted(&self, key: &'static str) -> StoreResult<()> {
        self.backend.remove(key)
    }
}

// ── Timestamps ────────────────────────────────────────────────────────────────

/// A timestamp strictly after `prev`.
///
/// `updated_at` must strictly increase across mutations of the same record;
/// when the wall clock has not advanced past `prev` (sub-microsecond
/// back-to-back updates, clock steps), the previous value is nudged forward
/// instead.
pub(crate) fn touch_after(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > prev {
        now
    } else {
        prev + Duration::microseconds(1)
    }
}

// ── Hydration helpers ─────────────────────────────────────────────────────────

fn hydrate_table<T: DeserializeOwned>(
    backend: &impl StorageBackend,
    key: &'static str,
    default: Vec<T>,
    report: &mut HydrationReport,
) -> StoreResult<Vec<T>> {
    match backend.load(key)? {
        None => Ok(default),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(rows) => Ok(rows),
            Err(e) => {
                warn!(key, error = %e, "persisted table failed to decode; using default rows");
                report.recovered_keys.push(key);
                Ok(default)
            }
        },
    }
}

fn hydrate_singular<T: DeserializeOwned>(
    backend: &impl StorageBackend,
    key: &'static str,
    default: T,
    report: &mut HydrationReport,
) -> StoreResult<T> {
    match backend.load(key)? {
        None => Ok(default),
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key, error = %e, "persisted record failed to decode; using default");
                report.recovered_keys.push(key);
                Ok(default)
            }
        },
    }
}

/// Load the persisted session, clearing it when malformed or expired.
///
/// Typed decoding covers the cleanup: a stale session whose `user.id` is
/// not a well-formed UUID fails to decode and is removed.
fn hydrate_session(
    backend: &impl StorageBackend,
    report: &mut HydrationReport,
) -> StoreResult<Option<Session>> {
    let Some(raw) = backend.load(keys::SESSION)? else {
        return Ok(None);
    };

    match serde_json::from_str::<Session>(&raw) {
        Ok(session) if !session.is_expired_at(Utc::now()) => Ok(Some(session)),
        Ok(session) => {
            warn!(user_id = %session.user.id, "persisted session expired; clearing");
            backend.remove(keys::SESSION)?;
            report.session_cleared = true;
            Ok(None)
        }
        Err(e) => {
            warn!(error = %e, "persisted session failed to decode; clearing");
            backend.remove(keys::SESSION)?;
            report.session_cleared = true;
            Ok(None)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use carelink_contracts::session::Session;
    use carelink_contracts::user::{NewUser, Role};

    use crate::backend::{keys, MemoryBackend, StorageBackend};
    use crate::dataset::Dataset;
    use crate::testutil::{new_patient, new_user};

    use super::{touch_after, RecordStore};

    fn open(backend: MemoryBackend) -> RecordStore {
        RecordStore::open(backend, Dataset::default()).unwrap().0
    }

    #[test]
    fn touch_after_is_strictly_increasing_even_under_a_stalled_clock() {
        let future = Utc::now() + Duration::hours(1);
        let touched = touch_after(future);
        assert!(touched > future);
    }

    #[test]
    fn reopen_reproduces_the_in_memory_tables() {
        let backend = MemoryBackend::new();
        let store = open(backend.clone());

        let doctor = store
            .create_doctor(new_user(Role::Doctor, "Dr. Before", "before@example.org"))
            .unwrap();
        let patient_user = store
            .sign_up(new_user(Role::Patient, "Pim", "pim@example.org"))
            .unwrap();
        let profile = store.create_patient(new_patient(patient_user.id)).unwrap();

        // Simulated restart: a fresh store over the same backend map.
        let reopened = open(backend);

        assert_eq!(reopened.user_by_id(doctor.id), Some(doctor));
        assert_eq!(
            reopened.patient_by_id(profile.id).map(|v| v.profile),
            Some(profile)
        );
        assert_eq!(reopened.list_users(None).len(), 2);
    }

    #[test]
    fn corrupt_table_falls_back_to_defaults_and_is_surfaced() {
        let backend = MemoryBackend::new();
        backend.store(keys::TASKS, "{ definitely not a task array").unwrap();

        let (store, report) = RecordStore::open(backend, Dataset::default()).unwrap();

        assert!(report.recovered_keys.contains(&keys::TASKS));
        assert!(store.list_tasks().is_empty());
    }

    #[test]
    fn malformed_session_is_cleared_at_open() {
        let backend = MemoryBackend::new();
        // A legacy seed session with a non-UUID user id fails typed decoding.
        backend
            .store(
                keys::SESSION,
                r#"{"user":{"id":"patient-1","role":"patient"},"token":"t","expires_at":"2099-01-01T00:00:00Z"}"#,
            )
            .unwrap();

        let (store, report) = RecordStore::open(backend.clone(), Dataset::default()).unwrap();

        assert!(report.session_cleared);
        assert_eq!(store.current_session(), None);
        assert_eq!(backend.load(keys::SESSION).unwrap(), None);
    }

    #[test]
    fn expired_session_is_cleared_at_open() {
        let backend = MemoryBackend::new();
        let store = open(backend.clone());
        let user = store
            .sign_up(NewUser {
                role: Role::Patient,
                name: "Pim".to_string(),
                email: "pim@example.org".to_string(),
                password: "secret".to_string(),
                photo_url: None,
                phone: None,
                date_of_birth: None,
            })
            .unwrap();

        let expired = Session {
            user,
            token: "stale".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
        };
        backend
            .store(keys::SESSION, &serde_json::to_string(&expired).unwrap())
            .unwrap();

        let (reopened, report) = RecordStore::open(backend, Dataset::default()).unwrap();
        assert!(report.session_cleared);
        assert_eq!(reopened.current_session(), None);
    }

    #[test]
    fn sequences_are_reconciled_from_pre_mark_data() {
        let backend = MemoryBackend::new();
        let store = open(backend.clone());
        let user = store
            .sign_up(new_user(Role::Patient, "Pim", "pim@example.org"))
            .unwrap();
        store.create_patient(new_patient(user.id)).unwrap();

        // Simulate data written before the high-water marks existed.
        backend.remove(keys::SEQUENCES).unwrap();

        let reopened = open(backend);
        let other = reopened
            .sign_up(new_user(Role::Patient, "Noi", "noi@example.org"))
            .unwrap();
        let profile = reopened.create_patient(new_patient(other.id)).unwrap();

        assert_eq!(profile.medical_record_number, "MRN-000002");
    }
}
