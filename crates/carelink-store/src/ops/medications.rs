//! Medications, intake logs, and the request/approval workflow.
//!
//! Request statuses move only along the sanctioned transitions —
//! `pending → approved | declined` at review, `approved → fulfilled` at
//! dispensing.  Free-form status writes are not offered.

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use carelink_contracts::error::{StoreError, StoreResult};
use carelink_contracts::medication::{
    Medication, MedicationIntake, MedicationRequest, MedicationUpdate, NewMedication,
    NewMedicationIntake, NewMedicationRequest, RequestStatus,
};

use crate::backend::keys;
use crate::store::{touch_after, RecordStore};
use crate::views::{MedicationRequestView, MedicationView};

impl RecordStore {
    // ── Medications ───────────────────────────────────────────────────────────

    /// Prescribe a medication. `active` starts true.
    pub fn create_medication(&self, new: NewMedication) -> StoreResult<Medication> {
        if new.name.trim().is_empty() {
            return Err(StoreError::validation("medication name is required"));
        }
        if new.schedule.is_empty() {
            return Err(StoreError::validation(
                "a medication needs at least one schedule slot",
            ));
        }

        let mut state = self.lock();
        let now = Utc::now();
        let mut schedule = new.schedule;
        schedule.sort();
        let medication = Medication {
            id: Uuid::new_v4(),
            patient_id: new.patient_id,
            prescribed_by: new.prescribed_by,
            name: new.name,
            dosage: new.dosage,
            instructions: new.instructions,
            schedule,
            start_date: new.start_date,
            end_date: new.end_date,
            active: true,
            created_at: now,
            updated_at: now,
        };

        state.data.medications.push(medication.clone());
        self.persist(keys::MEDICATIONS, &state.data.medications)?;

        info!(
            medication_id = %medication.id,
            patient_id = %medication.patient_id,
            name = %medication.name,
            "medication prescribed"
        );
        Ok(medication)
    }

    /// One patient's medications, joined, newest first.
    pub fn medications_for_patient(&self, patient_id: Uuid) -> Vec<MedicationView> {
        let state = self.lock();
        let mut medications: Vec<Medication> = state
            .data
            .medications
            .iter()
            .filter(|m| m.patient_id == patient_id)
            .cloned()
            .collect();
        medications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        medications
            .into_iter()
            .map(|m| MedicationView {
                patient: state.patient_by_id(m.patient_id),
                prescriber: state.user_by_id(m.prescribed_by),
                medication: m,
            })
            .collect()
    }

    /// One patient's dose slots for `date`, earliest first — the schedule
    /// view for a day. Only medications in effect on that date contribute.
    pub fn daily_schedule(&self, patient_id: Uuid, date: NaiveDate) -> Vec<(NaiveTime, Medication)> {
        let state = self.lock();
        let mut slots: Vec<(NaiveTime, Medication)> = Vec::new();
        for medication in &state.data.medications {
            if medication.patient_id != patient_id || !medication.in_effect_on(date) {
                continue;
            }
            for slot in &medication.schedule {
                slots.push((*slot, medication.clone()));
            }
        }
        slots.sort_by_key(|(slot, _)| *slot);
        slots
    }

    /// Merge `update` over the medication.
    pub fn update_medication(&self, id: Uuid, update: MedicationUpdate) -> StoreResult<Medication> {
        let mut state = self.lock();
        let medication = state
            .data
            .medications
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::not_found("medication", id))?;

        let prev_updated = medication.updated_at;
        update.apply(medication);
        medication.schedule.sort();
        medication.updated_at = touch_after(prev_updated);
        let medication = medication.clone();

        self.persist(keys::MEDICATIONS, &state.data.medications)?;
        Ok(medication)
    }

    /// Hard delete. Intake history for the medication stays in place.
    pub fn delete_medication(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.medications.len();
        state.data.medications.retain(|m| m.id != id);
        if state.data.medications.len() == before {
            return Err(StoreError::not_found("medication", id));
        }
        self.persist(keys::MEDICATIONS, &state.data.medications)
    }

    // ── Intake log ────────────────────────────────────────────────────────────

    /// Log a dose.
    pub fn record_intake(&self, new: NewMedicationIntake) -> StoreResult<MedicationIntake> {
        let mut state = self.lock();
        let now = Utc::now();
        let intake = MedicationIntake {
            id: Uuid::new_v4(),
            medication_id: new.medication_id,
            taken_at: new.taken_at,
            schedule_slot: new.schedule_slot,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };

        state.data.medication_intakes.push(intake.clone());
        self.persist(keys::MEDICATION_INTAKES, &state.data.medication_intakes)?;

        debug!(intake_id = %intake.id, medication_id = %intake.medication_id, "intake logged");
        Ok(intake)
    }

    /// One medication's intake log, most recent dose first.
    pub fn intakes_for_medication(&self, medication_id: Uuid) -> Vec<MedicationIntake> {
        let state = self.lock();
        let mut intakes: Vec<MedicationIntake> = state
            .data
            .medication_intakes
            .iter()
            .filter(|i| i.medication_id == medication_id)
            .cloned()
            .collect();
        intakes.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
        intakes
    }

    // ── Request workflow ──────────────────────────────────────────────────────

    /// File a medication request. Status starts at `Pending`.
    pub fn create_medication_request(
        &self,
        new: NewMedicationRequest,
    ) -> StoreResult<MedicationRequest> {
        if new.medication_name.trim().is_empty() {
            return Err(StoreError::validation("medication name is required"));
        }

        let mut state = self.lock();
        let now = Utc::now();
        let request = MedicationRequest {
            id: Uuid::new_v4(),
            patient_id: new.patient_id,
            medication_name: new.medication_name,
            reason: new.reason,
            status: RequestStatus::Pending,
            reviewed_by: None,
            review_note: None,
            reviewed_at: None,
            fulfilled_at: None,
            created_at: now,
            updated_at: now,
        };

        state.data.medication_requests.push(request.clone());
        self.persist(keys::MEDICATION_REQUESTS, &state.data.medication_requests)?;

        info!(request_id = %request.id, patient_id = %request.patient_id, "medication request filed");
        Ok(request)
    }

    /// Medication requests, optionally filtered by status, joined, newest
    /// first.
    pub fn list_medication_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Vec<MedicationRequestView> {
        let state = self.lock();
        let mut requests: Vec<MedicationRequest> = state
            .data
            .medication_requests
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
            .into_iter()
            .map(|r| MedicationRequestView {
                patient: state.patient_by_id(r.patient_id),
                reviewer: r.reviewed_by.and_then(|id| state.user_by_id(id)),
                request: r,
            })
            .collect()
    }

    /// Review a pending request: approve or decline, stamping the reviewer.
    pub fn review_medication_request(
        &self,
        id: Uuid,
        reviewer_id: Uuid,
        approve: bool,
        note: Option<String>,
    ) -> StoreResult<MedicationRequest> {
        let mut state = self.lock();
        let request = state
            .data
            .medication_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found("medication request", id))?;

        if request.status != RequestStatus::Pending {
            return Err(StoreError::validation(format!(
                "cannot review a request in status {}",
                request.status.label()
            )));
        }

        let now = touch_after(request.updated_at);
        request.status = if approve {
            RequestStatus::Approved
        } else {
            RequestStatus::Declined
        };
        request.reviewed_by = Some(reviewer_id);
        request.review_note = note;
        request.reviewed_at = Some(now);
        request.updated_at = now;
        let request = request.clone();

        self.persist(keys::MEDICATION_REQUESTS, &state.data.medication_requests)?;

        info!(request_id = %id, status = request.status.label(), "medication request reviewed");
        Ok(request)
    }

    /// Mark an approved request fulfilled.
    pub fn fulfill_medication_request(&self, id: Uuid) -> StoreResult<MedicationRequest> {
        let mut state = self.lock();
        let request = state
            .data
            .medication_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found("medication request", id))?;

        if request.status != RequestStatus::Approved {
            return Err(StoreError::validation(format!(
                "cannot fulfill a request in status {}",
                request.status.label()
            )));
        }

        let now = touch_after(request.updated_at);
        request.status = RequestStatus::Fulfilled;
        request.fulfilled_at = Some(now);
        request.updated_at = now;
        let request = request.clone();

        self.persist(keys::MEDICATION_REQUESTS, &state.data.medication_requests)?;

        info!(request_id = %id, "medication request fulfilled");
        Ok(request)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
