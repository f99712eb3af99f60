//! Clinical entries: daily records, doctor visit notes, PHQ-9 assessments.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use carelink_contracts::assessment::{MentalAssessment, Severity};
use carelink_contracts::clinical::{
    DailyRecord, DailyRecordUpdate, DoctorRecord, DoctorRecordUpdate, NewDailyRecord,
    NewDoctorRecord,
};
use carelink_contracts::error::{StoreError, StoreResult};

use crate::backend::keys;
use crate::store::{touch_after, RecordStore};
use crate::views::{AssessmentView, DailyRecordView, DoctorRecordView};

impl RecordStore {
    // ── Daily records ─────────────────────────────────────────────────────────

    /// Record a patient's daily submission.
    ///
    /// When the patient's profile carries a doctor-authored daily form, the
    /// custom responses are validated against it before anything is stored.
    /// A record for an unknown patient is allowed (no referential
    /// enforcement anywhere in the store) — it simply has no form to check.
    pub fn create_daily_record(&self, new: NewDailyRecord) -> StoreResult<DailyRecord> {
        let mut state = self.lock();

        if let Some(profile) = state.patient_by_id(new.patient_id) {
            if !profile.daily_form.is_empty() {
                let report =
                    carelink_forms::validate_responses(&profile.daily_form, &new.custom_responses);
                if !report.passed() {
                    return Err(StoreError::validation(format!(
                        "daily form response rejected: {}",
                        report.first_message().unwrap_or("invalid responses")
                    )));
                }
            }
        }

        let now = Utc::now();
        let record = DailyRecord {
            id: Uuid::new_v4(),
            patient_id: new.patient_id,
            record_date: new.record_date,
            vitals: new.vitals,
            symptoms: new.symptoms,
            notes: new.notes,
            custom_responses: new.custom_responses,
            doctor_instructions: None,
            flags: new.flags,
            created_at: now,
            updated_at: now,
        };

        state.data.daily_records.push(record.clone());
        self.persist(keys::DAILY_RECORDS, &state.data.daily_records)?;

        debug!(
            record_id = %record.id,
            patient_id = %record.patient_id,
            flag_count = record.flags.len(),
            "daily record created"
        );
        Ok(record)
    }

    /// One patient's daily records, joined, newest first.
    pub fn daily_records_for_patient(&self, patient_id: Uuid) -> Vec<DailyRecordView> {
        self.list_daily_records()
            .into_iter()
            .filter(|v| v.record.patient_id == patient_id)
            .collect()
    }

    /// Every daily record, joined, newest first.
    pub fn list_daily_records(&self) -> Vec<DailyRecordView> {
        let state = self.lock();
        let mut records = state.data.daily_records.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
            .into_iter()
            .map(|r| DailyRecordView {
                patient: state.patient_by_id(r.patient_id),
                record: r,
            })
            .collect()
    }

    /// Merge `update` over the record (doctor review path).
    pub fn update_daily_record(
        &self,
        id: Uuid,
        update: DailyRecordUpdate,
    ) -> StoreResult<DailyRecord> {
        let mut state = self.lock();
        let record = state
            .data
            .daily_records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found("daily record", id))?;

        let prev_updated = record.updated_at;
        update.apply(record);
        record.updated_at = touch_after(prev_updated);
        let record = record.clone();

        self.persist(keys::DAILY_RECORDS, &state.data.daily_records)?;
        Ok(record)
    }

    /// Hard delete.
    pub fn delete_daily_record(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.daily_records.len();
        state.data.daily_records.retain(|r| r.id != id);
        if state.data.daily_records.len() == before {
            return Err(StoreError::not_found("daily record", id));
        }
        self.persist(keys::DAILY_RECORDS, &state.data.daily_records)
    }

    // ── Doctor visit notes ────────────────────────────────────────────────────

    /// Record a doctor-authored visit note.
    pub fn create_doctor_record(&self, new: NewDoctorRecord) -> StoreResult<DoctorRecord> {
        if new.diagnosis.trim().is_empty() {
            return Err(StoreError::validation("diagnosis is required"));
        }

        let mut state = self.lock();
        let now = Utc::now();
        let record = DoctorRecord {
            id: Uuid::new_v4(),
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            visit_date: new.visit_date,
            diagnosis: new.diagnosis,
            treatment: new.treatment,
            notes: new.notes,
            follow_up_date: new.follow_up_date,
            created_at: now,
            updated_at: now,
        };

        state.data.doctor_records.push(record.clone());
        self.persist(keys::DOCTOR_RECORDS, &state.data.doctor_records)?;

        info!(record_id = %record.id, patient_id = %record.patient_id, "visit note recorded");
        Ok(record)
    }

    /// One patient's visit notes, joined, most recent visit first.
    pub fn doctor_records_for_patient(&self, patient_id: Uuid) -> Vec<DoctorRecordView> {
        let state = self.lock();
        let mut records: Vec<DoctorRecord> = state
            .data
            .doctor_records
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
        records
            .into_iter()
            .map(|r| DoctorRecordView {
                doctor: state.user_by_id(r.doctor_id),
                patient: state.patient_by_id(r.patient_id),
                record: r,
            })
            .collect()
    }

    /// Merge `update` over the visit note.
    pub fn update_doctor_record(
        &self,
        id: Uuid,
        update: DoctorRecordUpdate,
    ) -> StoreResult<DoctorRecord> {
        let mut state = self.lock();
        let record = state
            .data
            .doctor_records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::not_found("doctor record", id))?;

        let prev_updated = record.updated_at;
        update.apply(record);
        record.updated_at = touch_after(prev_updated);
        let record = record.clone();

        self.persist(keys::DOCTOR_RECORDS, &state.data.doctor_records)?;
        Ok(record)
    }

    /// Hard delete.
    pub fn delete_doctor_record(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.doctor_records.len();
        state.data.doctor_records.retain(|r| r.id != id);
        if state.data.doctor_records.len() == before {
            return Err(StoreError::not_found("doctor record", id));
        }
        self.persist(keys::DOCTOR_RECORDS, &state.data.doctor_records)
    }

    // ── PHQ-9 assessments ─────────────────────────────────────────────────────

    /// Score and record a PHQ-9 submission.
    ///
    /// Exactly nine answers, each 0–3; anything else is a validation error.
    /// The total and severity bucket are derived here so a stored assessment
    /// can never disagree with its answers.
    pub fn record_assessment(
        &self,
        patient_id: Uuid,
        answers: Vec<u8>,
    ) -> StoreResult<MentalAssessment> {
        if answers.len() != 9 {
            return Err(StoreError::validation(
                "PHQ-9 requires exactly nine answers",
            ));
        }
        if answers.iter().any(|a| *a > 3) {
            return Err(StoreError::validation(
                "PHQ-9 answers must be between 0 and 3",
            ));
        }

        let total_score: u8 = answers.iter().sum();
        let severity = Severity::from_total(total_score);

        let mut state = self.lock();
        let now = Utc::now();
        let assessment = MentalAssessment {
            id: Uuid::new_v4(),
            patient_id,
            answers,
            total_score,
            severity,
            created_at: now,
            updated_at: now,
        };

        state.data.mental_assessments.push(assessment.clone());
        self.persist(keys::MENTAL_ASSESSMENTS, &state.data.mental_assessments)?;

        info!(
            assessment_id = %assessment.id,
            patient_id = %patient_id,
            total = total_score,
            severity = severity.label(),
            "assessment recorded"
        );
        Ok(assessment)
    }

    /// One patient's assessments, joined, newest first.
    pub fn assessments_for_patient(&self, patient_id: Uuid) -> Vec<AssessmentView> {
        let state = self.lock();
        let mut assessments: Vec<MentalAssessment> = state
            .data
            .mental_assessments
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        assessments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        assessments
            .into_iter()
            .map(|a| AssessmentView {
                patient: state.patient_by_id(a.patient_id),
                assessment: a,
            })
            .collect()
    }

    /// Hard delete.
    pub fn delete_assessment(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.mental_assessments.len();
        state.data.mental_assessments.retain(|a| a.id != id);
        if state.data.mental_assessments.len() == before {
            return Err(StoreError::not_found("assessment", id));
        }
        self.persist(keys::MENTAL_ASSESSMENTS, &state.data.mental_assessments)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use carelink_contracts::assessment::Severity;
    use carelink_contracts::clinical::{DailyRecordUpdate, NewDailyRecord, NewDoctorRecord};
    use carelink_contracts::form::{FieldKind, FormField};
    use carelink_contracts::profile::NewPatientProfile;
    use carelink_contracts::user::Role;

    use crate::testutil::{new_patient, new_user, open_store};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn daily(patient_id: uuid::Uuid) -> NewDailyRecord {
        NewDailyRecord {
            patient_id,
            record_date: day(20),
            vitals: Default::default(),
            symptoms: None,
            notes: None,
            custom_responses: Default::default(),
            flags: Vec::new(),
        }
    }

    #[test]
    fn daily_record_validates_the_profile_form() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Patient, "P", "p@example.org")).unwrap();
        let profile = store
            .create_patient(NewPatientProfile {
                daily_form: vec![FormField::required(
                    "slept_well",
                    "Slept well?",
                    FieldKind::Checkbox,
                )],
                ..new_patient(user.id)
            })
            .unwrap();

        let err = store.create_daily_record(daily(profile.id)).unwrap_err();
        assert!(err.to_string().contains("daily form response rejected"));

        let record = store
            .create_daily_record(NewDailyRecord {
                custom_responses: json!({ "slept_well": true }).as_object().cloned().unwrap(),
                ..daily(profile.id)
            })
            .unwrap();
        assert_eq!(record.custom_responses.get("slept_well"), Some(&json!(true)));
    }

    #[test]
    fn daily_record_without_a_profile_skips_form_validation() {
        let store = open_store();
        let orphan = uuid::Uuid::new_v4();
        let record = store.create_daily_record(daily(orphan)).unwrap();
        assert_eq!(record.patient_id, orphan);
    }

    #[test]
    fn doctor_review_adds_instructions_without_touching_the_submission() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Patient, "P", "p@example.org")).unwrap();
        let profile = store.create_patient(new_patient(user.id)).unwrap();
        let record = store
            .create_daily_record(NewDailyRecord {
                symptoms: Some("headache".to_string()),
                ..daily(profile.id)
            })
            .unwrap();

        let reviewed = store
            .update_daily_record(
                record.id,
                DailyRecordUpdate {
                    doctor_instructions: Some("rest and hydrate".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(reviewed.symptoms.as_deref(), Some("headache"));
        assert_eq!(reviewed.doctor_instructions.as_deref(), Some("rest and hydrate"));
        assert!(reviewed.updated_at > record.updated_at);
    }

    #[test]
    fn visit_notes_sort_by_visit_date_not_insertion() {
        let store = open_store();
        let doctor = store.create_doctor(new_user(Role::Doctor, "D", "d@example.org")).unwrap();
        let user = store.sign_up(new_user(Role::Patient, "P", "p@example.org")).unwrap();
        let profile = store.create_patient(new_patient(user.id)).unwrap();

        for (visit_day, diagnosis) in [(3, "earlier"), (14, "latest"), (9, "middle")] {
            store
                .create_doctor_record(NewDoctorRecord {
                    patient_id: profile.id,
                    doctor_id: doctor.id,
                    visit_date: day(visit_day),
                    diagnosis: diagnosis.to_string(),
                    treatment: None,
                    notes: None,
                    follow_up_date: None,
                })
                .unwrap();
        }

        let notes = store.doctor_records_for_patient(profile.id);
        let order: Vec<&str> = notes.iter().map(|v| v.record.diagnosis.as_str()).collect();
        assert_eq!(order, ["latest", "middle", "earlier"]);
        assert_eq!(notes[0].doctor.as_ref().unwrap().id, doctor.id);
    }

    #[test]
    fn assessment_scoring_is_derived_in_the_store() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Patient, "P", "p@example.org")).unwrap();
        let profile = store.create_patient(new_patient(user.id)).unwrap();

        let assessment = store
            .record_assessment(profile.id, vec![2, 2, 2, 2, 2, 1, 1, 1, 2])
            .unwrap();
        assert_eq!(assessment.total_score, 15);
        assert_eq!(assessment.severity, Severity::ModeratelySevere);

        let history = store.assessments_for_patient(profile.id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].patient.as_ref().unwrap().id, profile.id);
    }

    #[test]
    fn assessment_input_strictness() {
        let store = open_store();
        let patient = uuid::Uuid::new_v4();

        let too_few = store.record_assessment(patient, vec![1; 8]).unwrap_err();
        assert!(too_few.to_string().contains("exactly nine"));

        let out_of_range = store
            .record_assessment(patient, vec![0, 1, 2, 3, 4, 0, 0, 0, 0])
            .unwrap_err();
        assert!(out_of_range.to_string().contains("between 0 and 3"));
    }
}
