//! Sign-in sessions and small persisted UI preferences.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;

/// The singular persisted sign-in record.
///
/// Decoding is strict: a persisted session whose `user.id` is not a
/// well-formed UUID (legacy seed data) fails typed decoding and is cleared
/// by the hydration loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Snapshot of the signed-in user at sign-in time.
    pub user: User,
    /// Opaque bearer token (hex-encoded digest).
    pub token: String,
    /// Fixed at 24 hours from sign-in.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// True when the session has passed its expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Small persisted UI flags plus the reminder-send dedupe map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiPrefs {
    #[serde(default)]
    pub sidebar_collapsed: bool,
    /// Reminder sends already made, keyed
    /// `"{medication_id}:{HH:MM}:{YYYY-MM-DD}"`. Entries from previous days
    /// are pruned on write.
    #[serde(default)]
    pub reminders_sent: BTreeMap<String, DateTime<Utc>>,
}
