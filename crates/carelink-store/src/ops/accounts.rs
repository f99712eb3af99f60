//! User account operations: sign-up, staff invite flows, profile edits.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use carelink_contracts::error::{StoreError, StoreResult};
use carelink_contracts::profile::{NewVolunteerProfile, VolunteerProfile};
use carelink_contracts::user::{NewUser, Role, User, UserUpdate};

use crate::backend::keys;
use crate::store::{touch_after, RecordStore, State};

impl RecordStore {
    /// Create an account at sign-up.
    ///
    /// The only store-side validation classes: required fields must be
    /// non-empty and the email must not already be registered.
    pub fn sign_up(&self, new: NewUser) -> StoreResult<User> {
        let mut state = self.lock();
        validate_new_user(&new, &state)?;

        let user = build_user(new, None);
        state.data.users.push(user.clone());
        self.persist(keys::USERS, &state.data.users)?;

        info!(user_id = %user.id, role = user.role.label(), "user signed up");
        Ok(user)
    }

    /// Staff invite flow: create a doctor account with the next sequential
    /// `DOC-` display code. The requested role is overridden.
    pub fn create_doctor(&self, new: NewUser) -> StoreResult<User> {
        let mut state = self.lock();
        validate_new_user(&new, &state)?;

        let code = state.sequences.next_doctor_code();
        let mut user = build_user(new, Some(code.clone()));
        user.role = Role::Doctor;
        state.data.users.push(user.clone());

        self.persist(keys::USERS, &state.data.users)?;
        self.persist(keys::SEQUENCES, &state.sequences)?;

        info!(user_id = %user.id, doctor_code = %code, "doctor created");
        Ok(user)
    }

    /// Staff invite flow: create a volunteer account together with its
    /// profile. An explicit `volunteer_code` (imports) bumps the sequence
    /// mark past itself; otherwise the next code is assigned.
    pub fn create_volunteer(
        &self,
        new: NewUser,
        profile: NewVolunteerProfile,
    ) -> StoreResult<(User, VolunteerProfile)> {
        let mut state = self.lock();
        validate_new_user(&new, &state)?;

        let code = match profile.volunteer_code {
            Some(code) => {
                if code.trim().is_empty() {
                    return Err(StoreError::validation("volunteer code must not be empty"));
                }
                state.sequences.cover_volunteer_code(&code);
                code
            }
            None => state.sequences.next_volunteer_code(),
        };

        let mut user = build_user(new, None);
        user.role = Role::Volunteer;

        let now = Utc::now();
        let volunteer = VolunteerProfile {
            id: Uuid::new_v4(),
            user_id: user.id,
            volunteer_code: code.clone(),
            map_area_id: profile.map_area_id,
            address: profile.address,
            notes: profile.notes,
            created_at: now,
            updated_at: now,
        };

        state.data.users.push(user.clone());
        state.data.volunteer_profiles.push(volunteer.clone());

        self.persist(keys::USERS, &state.data.users)?;
        self.persist(keys::VOLUNTEER_PROFILES, &state.data.volunteer_profiles)?;
        self.persist(keys::SEQUENCES, &state.sequences)?;

        info!(user_id = %user.id, volunteer_code = %code, "volunteer created");
        Ok((user, volunteer))
    }

    /// Plain lookup; `None` when the account does not exist.
    pub fn user_by_id(&self, id: Uuid) -> Option<User> {
        self.lock().user_by_id(id)
    }

    /// All accounts, optionally filtered by role, newest first.
    pub fn list_users(&self, role: Option<Role>) -> Vec<User> {
        let state = self.lock();
        let mut users: Vec<User> = state
            .data
            .users
            .iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        users
    }

    /// Merge `update` over the account. The id, role, display code, and
    /// `created_at` are immutable; `updated_at` strictly increases.
    pub fn update_user(&self, id: Uuid, update: UserUpdate) -> StoreResult<User> {
        let mut state = self.lock();

        if let Some(email) = &update.email {
            let taken = state
                .data
                .users
                .iter()
                .any(|u| u.id != id && u.email.eq_ignore_ascii_case(email));
            if taken {
                return Err(StoreError::validation("email already registered"));
            }
        }

        let user = state
            .data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::not_found("user", id))?;

        let prev_updated = user.updated_at;
        update.apply(user);
        user.updated_at = touch_after(prev_updated);
        let user = user.clone();

        self.persist(keys::USERS, &state.data.users)?;
        Ok(user)
    }

    /// Hard delete. No cascade: tasks, messages, and profiles referencing
    /// this account stay in place and their joins resolve to `None`.
    pub fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.users.len();
        state.data.users.retain(|u| u.id != id);
        if state.data.users.len() == before {
            return Err(StoreError::not_found("user", id));
        }
        self.persist(keys::USERS, &state.data.users)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn validate_new_user(new: &NewUser, state: &State) -> StoreResult<()> {
    if new.name.trim().is_empty() {
        return Err(StoreError::validation("name is required"));
    }
    if new.email.trim().is_empty() {
        return Err(StoreError::validation("email is required"));
    }
    if new.password.is_empty() {
        return Err(StoreError::validation("password is required"));
    }
    let taken = state
        .data
        .users
        .iter()
        .any(|u| u.email.eq_ignore_ascii_case(&new.email));
    if taken {
        return Err(StoreError::validation("email already registered"));
    }
    Ok(())
}

fn build_user(new: NewUser, doctor_code: Option<String>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        role: new.role,
        name: new.name,
        email: new.email,
        password: new.password,
        photo_url: new.photo_url,
        phone: new.phone,
        date_of_birth: new.date_of_birth,
        doctor_code,
        created_at: now,
        updated_at: now,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
