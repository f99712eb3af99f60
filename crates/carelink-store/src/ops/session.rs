//! Sign-in sessions and persisted UI preferences.
//!
//! The session is a singular persisted record: a snapshot of the signed-in
//! user, an opaque token, and an expiry fixed at 24 hours from sign-in.
//! Password matching is plaintext, a documented weakness of the deployed
//! portal (see the `User` docs); nothing here pretends otherwise.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use carelink_contracts::error::{StoreError, StoreResult};
use carelink_contracts::session::{Session, UiPrefs};

use crate::backend::keys;
use crate::store::RecordStore;

/// Sessions expire this long after sign-in.
const SESSION_TTL_HOURS: i64 = 24;

impl RecordStore {
    /// Sign in with plaintext credentials.
    ///
    /// Both an unknown email and a wrong password produce the same
    /// validation error, so the message leaks nothing about which accounts
    /// exist.
    pub fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let mut state = self.lock();

        let user = state
            .data
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned();
        let user = match user {
            Some(u) if u.password == password => u,
            _ => return Err(StoreError::validation("invalid email or password")),
        };

        let expires_at = Utc::now() + Duration::hours(SESSION_TTL_HOURS);
        let session = Session {
            token: session_token(user.id, expires_at),
            user,
            expires_at,
        };

        state.session = Some(session.clone());
        self.persist(keys::SESSION, &session)?;

        info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    /// The current session, or `None` when signed out or expired.
    ///
    /// An expired session is cleared as a side effect, in memory and in the
    /// backend.
    pub fn current_session(&self) -> Option<Session> {
        let mut state = self.lock();
        match &state.session {
            Some(session) if !session.is_expired_at(Utc::now()) => Some(session.clone()),
            Some(session) => {
                warn!(user_id = %session.user.id, "session expired; clearing");
                state.session = None;
                if let Err(e) = self.remove_persisted(keys::SESSION) {
                    warn!(error = %e, "failed to clear persisted session");
                }
                None
            }
            None => None,
        }
    }

    /// Clear the session record.
    pub fn sign_out(&self) -> StoreResult<()> {
        let mut state = self.lock();
        if let Some(session) = state.session.take() {
            info!(user_id = %session.user.id, "signed out");
        }
        self.remove_persisted(keys::SESSION)
    }

    // ── UI preferences ────────────────────────────────────────────────────────

    /// The persisted UI preference record.
    pub fn ui_prefs(&self) -> UiPrefs {
        self.lock().prefs.clone()
    }

    /// Persist the sidebar collapsed flag.
    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> StoreResult<UiPrefs> {
        let mut state = self.lock();
        state.prefs.sidebar_collapsed = collapsed;
        self.persist(keys::UI_PREFS, &state.prefs)?;
        Ok(state.prefs.clone())
    }

    /// True when a reminder send is already recorded under `dedupe_key`.
    pub fn reminder_sent(&self, dedupe_key: &str) -> bool {
        self.lock().prefs.reminders_sent.contains_key(dedupe_key)
    }

    /// Record a reminder send under `dedupe_key`, pruning entries from days
    /// other than `sent_at`'s.
    pub fn mark_reminder_sent(&self, dedupe_key: &str, sent_at: DateTime<Utc>) -> StoreResult<()> {
        let mut state = self.lock();
        let day_suffix = sent_at.date_naive().format("%Y-%m-%d").to_string();
        state
            .prefs
            .reminders_sent
            .retain(|key, _| key.ends_with(&day_suffix));
        state
            .prefs
            .reminders_sent
            .insert(dedupe_key.to_string(), sent_at);
        self.persist(keys::UI_PREFS, &state.prefs)
    }
}

/// Derive an opaque session token: SHA-256 over the user id, the expiry, and
/// a fresh UUID, hex encoded.
fn session_token(user_id: Uuid, expires_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(expires_at.to_rfc3339().as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    hex::encode(hasher.finalize())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use carelink_contracts::user::Role;

    use crate::backend::{keys, StorageBackend};
    use crate::testutil::{new_user, open_store};

    #[test]
    fn sign_in_issues_a_24_hour_session() {
        let store = open_store();
        let user = store
            .sign_up(new_user(Role::Patient, "Pim", "pim@example.org"))
            .unwrap();

        let before = Utc::now();
        let session = store.sign_in("pim@example.org", "secret").unwrap();

        assert_eq!(session.user.id, user.id);
        assert_eq!(session.token.len(), 64, "token must be a hex sha-256 digest");
        assert!(session.expires_at >= before + Duration::hours(24));
        assert_eq!(store.current_session(), Some(session));
    }

    #[test]
    fn wrong_password_and_unknown_email_fail_identically() {
        let store = open_store();
        store
            .sign_up(new_user(Role::Patient, "Pim", "pim@example.org"))
            .unwrap();

        let wrong_password = store.sign_in("pim@example.org", "nope").unwrap_err();
        let unknown_email = store.sign_in("ghost@example.org", "secret").unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[test]
    fn sign_out_clears_the_persisted_record() {
        let store = open_store();
        store
            .sign_up(new_user(Role::Patient, "Pim", "pim@example.org"))
            .unwrap();
        store.sign_in("pim@example.org", "secret").unwrap();

        store.sign_out().unwrap();
        assert_eq!(store.current_session(), None);
    }

    #[test]
    fn two_sign_ins_produce_distinct_tokens() {
        let store = open_store();
        store
            .sign_up(new_user(Role::Patient, "Pim", "pim@example.org"))
            .unwrap();

        let first = store.sign_in("pim@example.org", "secret").unwrap();
        let second = store.sign_in("pim@example.org", "secret").unwrap();
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn sidebar_flag_round_trips() {
        let store = open_store();
        assert!(!store.ui_prefs().sidebar_collapsed);

        let prefs = store.set_sidebar_collapsed(true).unwrap();
        assert!(prefs.sidebar_collapsed);
        assert!(store.ui_prefs().sidebar_collapsed);
    }

    #[test]
    fn reminder_marks_dedupe_within_a_day_and_prune_across_days() {
        let store = open_store();
        let now = Utc::now();
        let today = now.date_naive().format("%Y-%m-%d").to_string();
        let yesterday = (now.date_naive() - Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();

        let stale_key = format!("med-1:08:00:{yesterday}");
        let todays_key = format!("med-1:08:00:{today}");

        store.mark_reminder_sent(&stale_key, now - Duration::days(1)).unwrap();
        assert!(store.reminder_sent(&stale_key));

        // Writing today's key prunes yesterday's entry.
        store.mark_reminder_sent(&todays_key, now).unwrap();
        assert!(store.reminder_sent(&todays_key));
        assert!(!store.reminder_sent(&stale_key));
    }

    #[test]
    fn prefs_are_persisted_under_their_fixed_key() {
        let backend = crate::backend::MemoryBackend::new();
        let store = crate::store::RecordStore::open(backend.clone(), crate::dataset::Dataset::default())
            .unwrap()
            .0;

        store.set_sidebar_collapsed(true).unwrap();

        let raw = backend.load(keys::UI_PREFS).unwrap().expect("prefs written");
        assert!(raw.contains("\"sidebar_collapsed\":true"));
    }
}
