//! Alert dispatch for flagged daily records and PHQ-9 assessments.
//!
//! Submission goes through here rather than straight to the store so the
//! triage evaluation and the resulting notifications happen in one step:
//! a flagged daily record notifies the assigned volunteer, books an
//! immediate follow-up appointment for them, and sends the assigned doctor
//! an FYI; a PHQ-9 submission always notifies the volunteer and escalates
//! to the doctor from `moderately_severe` up. Alert messages are sent from
//! the patient's own account. A missing assignment skips that leg only;
//! the outcome records what was actually sent.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use carelink_contracts::assessment::{MentalAssessment, Severity};
use carelink_contracts::clinical::{DailyRecord, NewDailyRecord};
use carelink_contracts::error::StoreResult;
use carelink_contracts::message::NewMessage;
use carelink_contracts::task::{NewTask, Priority, TaskKind};
use carelink_store::views::PatientView;
use carelink_store::RecordStore;

use crate::thresholds::TriageThresholds;
use crate::vitals::{evaluate_vitals, VitalsReview};

/// What an alert dispatch actually sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertOutcome {
    /// The flag strings that triggered the dispatch; empty when clear.
    pub flags: Vec<String>,
    pub volunteer_message_id: Option<Uuid>,
    pub follow_up_task_id: Option<Uuid>,
    pub doctor_message_id: Option<Uuid>,
}

impl AlertOutcome {
    /// True when at least one notification went out.
    pub fn anything_sent(&self) -> bool {
        self.volunteer_message_id.is_some()
            || self.follow_up_task_id.is_some()
            || self.doctor_message_id.is_some()
    }
}

/// The patient's display name for alert text; falls back to the MRN when the
/// account was deleted.
fn patient_display_name(view: &PatientView) -> String {
    view.user
        .as_ref()
        .map(|u| u.name.clone())
        .unwrap_or_else(|| view.profile.medical_record_number.clone())
}

/// Evaluate, store, and dispatch one daily record submission.
///
/// The triage flags are stamped onto the record before it is stored, so the
/// persisted record always carries the evaluation it was admitted with.
pub fn submit_daily_record(
    store: &RecordStore,
    thresholds: &TriageThresholds,
    mut new: NewDailyRecord,
) -> StoreResult<(DailyRecord, AlertOutcome)> {
    let review = evaluate_vitals(&new.vitals, thresholds);
    new.flags = review.flags.clone();

    let record = store.create_daily_record(new)?;
    if review.is_clear() {
        return Ok((record, AlertOutcome::default()));
    }

    let outcome = dispatch_vitals_alert(store, &record, &review)?;
    Ok((record, outcome))
}

fn dispatch_vitals_alert(
    store: &RecordStore,
    record: &DailyRecord,
    review: &VitalsReview,
) -> StoreResult<AlertOutcome> {
    let mut outcome = AlertOutcome {
        flags: review.flags.clone(),
        ..Default::default()
    };

    let Some(view) = store.patient_by_id(record.patient_id) else {
        warn!(patient_id = %record.patient_id, "flagged record has no patient profile; alert not dispatched");
        return Ok(outcome);
    };
    let Some(sender) = view.user.as_ref().map(|u| u.id) else {
        warn!(patient_id = %record.patient_id, "patient account deleted; alert not dispatched");
        return Ok(outcome);
    };

    let name = patient_display_name(&view);
    let summary = review.flags.join("; ");

    if let Some(volunteer_id) = view.profile.assigned_volunteer_id {
        let message = store.send_message(NewMessage {
            sender_id: sender,
            recipient_id: volunteer_id,
            content: format!("Health alert for {}: {}", name, summary),
            image_data: None,
        })?;
        outcome.volunteer_message_id = Some(message.id);

        let task = store.create_task(NewTask {
            kind: TaskKind::Appointment {
                patient_id: record.patient_id,
                scheduled_at: Utc::now(),
            },
            title: format!("Follow up on health alert for {}", name),
            description: Some(summary.clone()),
            priority: review.follow_up.unwrap_or(Priority::High),
            assigned_to: volunteer_id,
            assigned_by: sender,
            form_fields: Vec::new(),
        })?;
        outcome.follow_up_task_id = Some(task.id);
    } else {
        warn!(patient_id = %record.patient_id, "no assigned volunteer; volunteer leg skipped");
    }

    if let Some(doctor_id) = view.profile.assigned_doctor_id {
        let message = store.send_message(NewMessage {
            sender_id: sender,
            recipient_id: doctor_id,
            content: format!("FYI: today's record for {} was flagged: {}", name, summary),
            image_data: None,
        })?;
        outcome.doctor_message_id = Some(message.id);
    } else {
        warn!(patient_id = %record.patient_id, "no assigned doctor; doctor leg skipped");
    }

    info!(
        record_id = %record.id,
        patient_id = %record.patient_id,
        flag_count = outcome.flags.len(),
        volunteer_notified = outcome.volunteer_message_id.is_some(),
        doctor_notified = outcome.doctor_message_id.is_some(),
        "health alert dispatched"
    );
    Ok(outcome)
}

/// Score, store, and dispatch one PHQ-9 submission.
///
/// The assigned volunteer is always notified; the assigned doctor only from
/// `moderately_severe` up. No follow-up task is booked for assessments.
pub fn submit_assessment(
    store: &RecordStore,
    patient_id: Uuid,
    answers: Vec<u8>,
) -> StoreResult<(MentalAssessment, AlertOutcome)> {
    let assessment = store.record_assessment(patient_id, answers)?;

    let mut outcome = AlertOutcome {
        flags: vec![format!(
            "PHQ-9 total {} ({})",
            assessment.total_score,
            assessment.severity.label()
        )],
        ..Default::default()
    };

    let Some(view) = store.patient_by_id(patient_id) else {
        warn!(%patient_id, "assessment has no patient profile; alert not dispatched");
        return Ok((assessment, outcome));
    };
    let Some(sender) = view.user.as_ref().map(|u| u.id) else {
        warn!(%patient_id, "patient account deleted; alert not dispatched");
        return Ok((assessment, outcome));
    };

    let name = patient_display_name(&view);
    let content = format!(
        "Mental-health check-in for {}: PHQ-9 total {} ({})",
        name,
        assessment.total_score,
        assessment.severity.label()
    );

    if let Some(volunteer_id) = view.profile.assigned_volunteer_id {
        let message = store.send_message(NewMessage {
            sender_id: sender,
            recipient_id: volunteer_id,
            content: content.clone(),
            image_data: None,
        })?;
        outcome.volunteer_message_id = Some(message.id);
    }

    if assessment.severity >= Severity::ModeratelySevere {
        if let Some(doctor_id) = view.profile.assigned_doctor_id {
            let message = store.send_message(NewMessage {
                sender_id: sender,
                recipient_id: doctor_id,
                content,
                image_data: None,
            })?;
            outcome.doctor_message_id = Some(message.id);
        }
    }

    info!(
        assessment_id = %assessment.id,
        %patient_id,
        severity = assessment.severity.label(),
        volunteer_notified = outcome.volunteer_message_id.is_some(),
        doctor_notified = outcome.doctor_message_id.is_some(),
        "assessment dispatched"
    );
    Ok((assessment, outcome))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
