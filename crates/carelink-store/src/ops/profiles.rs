//! Patient and volunteer profile operations.
//!
//! Profile-for-user lookups return the structured `NotFound` error — the
//! "no rows" signal a caller renders as an empty/placeholder state — while
//! plain by-id lookups return `Option`.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use carelink_contracts::error::{StoreError, StoreResult};
use carelink_contracts::profile::{
    NewPatientProfile, PatientProfile, PatientProfileUpdate, VolunteerProfile,
    VolunteerProfileUpdate,
};

use crate::backend::keys;
use crate::store::{touch_after, RecordStore, State};
use crate::views::{PatientView, VolunteerView};

impl RecordStore {
    // ── Patients ──────────────────────────────────────────────────────────────

    /// Create a patient profile, assigning the next sequential MRN unless an
    /// explicit one is supplied (which bumps the sequence past itself).
    pub fn create_patient(&self, new: NewPatientProfile) -> StoreResult<PatientProfile> {
        let mut state = self.lock();

        let mrn = match new.medical_record_number {
            Some(mrn) => {
                if mrn.trim().is_empty() {
                    return Err(StoreError::validation(
                        "medical record number must not be empty",
                    ));
                }
                state.sequences.cover_mrn(&mrn);
                mrn
            }
            None => state.sequences.next_mrn(),
        };

        let now = Utc::now();
        let profile = PatientProfile {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            medical_record_number: mrn.clone(),
            address: new.address,
            blood_type: new.blood_type,
            allergies: new.allergies,
            chronic_conditions: new.chronic_conditions,
            critical: new.critical,
            elderly: new.elderly,
            pregnancy: new.pregnancy,
            assigned_doctor_id: new.assigned_doctor_id,
            assigned_volunteer_id: new.assigned_volunteer_id,
            map_area_id: new.map_area_id,
            home_location: new.home_location,
            daily_form: new.daily_form,
            created_at: now,
            updated_at: now,
        };

        state.data.patient_profiles.push(profile.clone());
        self.persist(keys::PATIENT_PROFILES, &state.data.patient_profiles)?;
        self.persist(keys::SEQUENCES, &state.sequences)?;

        info!(patient_id = %profile.id, mrn = %mrn, "patient profile created");
        Ok(profile)
    }

    /// Joined lookup; `None` when the profile does not exist.
    pub fn patient_by_id(&self, id: Uuid) -> Option<PatientView> {
        let state = self.lock();
        state.patient_by_id(id).map(|p| patient_view(&state, p))
    }

    /// The profile owned by `user_id`, or the structured "no rows" signal.
    pub fn patient_for_user(&self, user_id: Uuid) -> StoreResult<PatientView> {
        let state = self.lock();
        state
            .data
            .patient_profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .map(|p| patient_view(&state, p))
            .ok_or_else(|| StoreError::not_found("patient profile", user_id))
    }

    /// Every patient, joined, newest first.
    pub fn list_patients(&self) -> Vec<PatientView> {
        let state = self.lock();
        let mut profiles = state.data.patient_profiles.clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        profiles
            .into_iter()
            .map(|p| patient_view(&state, p))
            .collect()
    }

    /// The caseload assigned to one doctor, joined, newest first.
    pub fn patients_for_doctor(&self, doctor_user_id: Uuid) -> Vec<PatientView> {
        self.list_patients()
            .into_iter()
            .filter(|v| v.profile.assigned_doctor_id == Some(doctor_user_id))
            .collect()
    }

    /// The caseload assigned to one volunteer, joined, newest first.
    pub fn patients_for_volunteer(&self, volunteer_user_id: Uuid) -> Vec<PatientView> {
        self.list_patients()
            .into_iter()
            .filter(|v| v.profile.assigned_volunteer_id == Some(volunteer_user_id))
            .collect()
    }

    /// Merge `update` over the profile. The MRN is immutable.
    pub fn update_patient(
        &self,
        id: Uuid,
        update: PatientProfileUpdate,
    ) -> StoreResult<PatientProfile> {
        let mut state = self.lock();
        let profile = state
            .data
            .patient_profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("patient profile", id))?;

        let prev_updated = profile.updated_at;
        update.apply(profile);
        profile.updated_at = touch_after(prev_updated);
        let profile = profile.clone();

        self.persist(keys::PATIENT_PROFILES, &state.data.patient_profiles)?;
        Ok(profile)
    }

    /// Hard delete. The MRN sequence mark is untouched, so the code is never
    /// reused.
    pub fn delete_patient(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.patient_profiles.len();
        state.data.patient_profiles.retain(|p| p.id != id);
        if state.data.patient_profiles.len() == before {
            return Err(StoreError::not_found("patient profile", id));
        }
        self.persist(keys::PATIENT_PROFILES, &state.data.patient_profiles)?;
        info!(patient_id = %id, "patient profile deleted");
        Ok(())
    }

    // ── Volunteers ────────────────────────────────────────────────────────────

    /// Joined lookup; `None` when the profile does not exist.
    pub fn volunteer_by_id(&self, id: Uuid) -> Option<VolunteerView> {
        let state = self.lock();
        state
            .data
            .volunteer_profiles
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .map(|v| volunteer_view(&state, v))
    }

    /// The profile owned by `user_id`, or the structured "no rows" signal.
    pub fn volunteer_for_user(&self, user_id: Uuid) -> StoreResult<VolunteerView> {
        let state = self.lock();
        state
            .data
            .volunteer_profiles
            .iter()
            .find(|v| v.user_id == user_id)
            .cloned()
            .map(|v| volunteer_view(&state, v))
            .ok_or_else(|| StoreError::not_found("volunteer profile", user_id))
    }

    /// Every volunteer, joined, newest first.
    pub fn list_volunteers(&self) -> Vec<VolunteerView> {
        let state = self.lock();
        let mut profiles = state.data.volunteer_profiles.clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        profiles
            .into_iter()
            .map(|v| volunteer_view(&state, v))
            .collect()
    }

    /// Merge `update` over the profile. The volunteer code is immutable.
    pub fn update_volunteer(
        &self,
        id: Uuid,
        update: VolunteerProfileUpdate,
    ) -> StoreResult<VolunteerProfile> {
        let mut state = self.lock();
        let profile = state
            .data
            .volunteer_profiles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| StoreError::not_found("volunteer profile", id))?;

        let prev_updated = profile.updated_at;
        update.apply(profile);
        profile.updated_at = touch_after(prev_updated);
        let profile = profile.clone();

        self.persist(keys::VOLUNTEER_PROFILES, &state.data.volunteer_profiles)?;
        Ok(profile)
    }

    /// Hard delete; the code sequence mark is untouched.
    pub fn delete_volunteer(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.volunteer_profiles.len();
        state.data.volunteer_profiles.retain(|v| v.id != id);
        if state.data.volunteer_profiles.len() == before {
            return Err(StoreError::not_found("volunteer profile", id));
        }
        self.persist(keys::VOLUNTEER_PROFILES, &state.data.volunteer_profiles)?;
        info!(volunteer_id = %id, "volunteer profile deleted");
        Ok(())
    }
}

// ── Join helpers ──────────────────────────────────────────────────────────────

fn patient_view(state: &State, profile: PatientProfile) -> PatientView {
    let user = state.user_by_id(profile.user_id);
    let assigned_doctor = profile.assigned_doctor_id.and_then(|id| state.user_by_id(id));
    let assigned_volunteer = profile
        .assigned_volunteer_id
        .and_then(|id| state.user_by_id(id));
    PatientView {
        profile,
        user,
        assigned_doctor,
        assigned_volunteer,
    }
}

fn volunteer_view(state: &State, profile: VolunteerProfile) -> VolunteerView {
    let user = state.user_by_id(profile.user_id);
    let area = profile.map_area_id.and_then(|id| state.area_by_id(id));
    VolunteerView {
        profile,
        user,
        area,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
