//! The durable side-store boundary.
//!
//! A `StorageBackend` is a string-keyed JSON document store.  The record
//! store writes the **entire** table for an entity type under its fixed key
//! on every mutation and reads each key exactly once, at `open` — reads
//! during operation never touch the backend.
//!
//! Two implementations ship: `MemoryBackend` (a cloneable shared map, used
//! by tests to simulate a restart by reopening over the same map) and
//! `JsonFileBackend` (one `<key>.json` file per key under a root directory).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;

use carelink_contracts::error::{StoreError, StoreResult};

// ── Persisted keys ────────────────────────────────────────────────────────────

/// Fixed keys of the durable side-store. These are a binding external
/// contract: export tooling reads them directly.
pub mod keys {
    pub const USERS: &str = "users";
    pub const PATIENT_PROFILES: &str = "patient_profiles";
    pub const VOLUNTEER_PROFILES: &str = "volunteer_profiles";
    pub const TASKS: &str = "tasks";
    pub const MESSAGES: &str = "messages";
    pub const ANNOUNCEMENTS: &str = "announcements";
    pub const DAILY_RECORDS: &str = "daily_records";
    pub const DOCTOR_RECORDS: &str = "doctor_records";
    pub const MEDICATIONS: &str = "medications";
    pub const MEDICATION_INTAKES: &str = "medication_intakes";
    pub const MEDICATION_REQUESTS: &str = "medication_requests";
    pub const MENTAL_ASSESSMENTS: &str = "mental_assessments";
    pub const MAP_AREAS: &str = "map_areas";
    pub const MAP_LOCATIONS: &str = "map_locations";

    /// Singular records, not tables.
    pub const SESSION: &str = "session";
    pub const UI_PREFS: &str = "ui_prefs";
    pub const SEQUENCES: &str = "sequences";
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// A string key → JSON document store.
///
/// Documents are raw JSON text; typed decoding (and the corrupt-payload
/// fallback) is the hydration loader's job, so a backend never needs to
/// understand what it holds.
pub trait StorageBackend: Send + Sync {
    /// Read the document under `key`, or `None` when absent.
    fn load(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write `document` under `key`, replacing any previous value.
    fn store(&self, key: &str, document: &str) -> StoreResult<()>;

    /// Delete the document under `key`. Removing an absent key is not an
    /// error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

// ── In-memory backend ─────────────────────────────────────────────────────────

/// A shared in-memory backend.
///
/// Clones share the same underlying map, which is what the simulated-restart
/// tests rely on: open a store, mutate, then reopen over a clone of the
/// backend and observe identical tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The keys currently present, for inspection in tests and tooling.
    pub fn keys(&self) -> Vec<String> {
        let documents = self.documents.lock().expect("memory backend lock poisoned");
        documents.keys().cloned().collect()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let documents = self
            .documents
            .lock()
            .map_err(|e| StoreError::storage(format!("memory backend lock poisoned: {e}")))?;
        Ok(documents.get(key).cloned())
    }

    fn store(&self, key: &str, document: &str) -> StoreResult<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|e| StoreError::storage(format!("memory backend lock poisoned: {e}")))?;
        documents.insert(key.to_string(), document.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|e| StoreError::storage(format!("memory backend lock poisoned: {e}")))?;
        documents.remove(key);
        Ok(())
    }
}

// ── File backend ──────────────────────────────────────────────────────────────

/// A backend that keeps one `<key>.json` file per key under a root
/// directory.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    root: PathBuf,
}

impl JsonFileBackend {
    /// Create the root directory if needed and return a backend over it.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            StoreError::storage(format!(
                "failed to create data directory '{}': {e}",
                root.display()
            ))
        })?;
        debug!(root = %root.display(), "file backend opened");
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::storage(format!(
                "failed to read '{}': {e}",
                path.display()
            ))),
        }
    }

    fn store(&self, key: &str, document: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        std::fs::write(&path, document).map_err(|e| {
            StoreError::storage(format!("failed to write '{}': {e}", path.display()))
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::storage(format!(
                "failed to remove '{}': {e}",
                path.display()
            ))),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
