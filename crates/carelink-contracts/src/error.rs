//! Error types for the carelink record store.
//!
//! All fallible store operations return `StoreResult<T>`.  The taxonomy is
//! deliberately small: callers render `NotFound` as an empty/placeholder
//! state and `Validation` as an inline message; `Storage` is the only class
//! that indicates something outside the caller's control went wrong.

use thiserror::Error;

/// The unified error type for the carelink store and the layers above it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    ///
    /// Also the structured "no rows" signal for profile-for-user lookups,
    /// which distinguishes a legitimately absent profile from other failures.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The caller supplied input the store refuses to record.
    ///
    /// Covers the two recoverable classes the UI renders inline: duplicate
    /// email at sign-up and missing/ill-formed required fields, plus the
    /// store-enforced invariants (completion report gate, request workflow
    /// transitions, form response validation).
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// The durable side-store could not be read or written.
    #[error("storage backend error: {reason}")]
    Storage { reason: String },
}

impl StoreError {
    /// Shorthand for a `NotFound` with a displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a `Validation` error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a `Storage` error.
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::Storage {
            reason: reason.into(),
        }
    }

    /// True when this error is the structured "no rows" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias used throughout the carelink crates.
pub type StoreResult<T> = Result<T, StoreError>;
