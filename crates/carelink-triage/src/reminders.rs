//! Medication reminder sweep.
//!
//! Periodically invoked (the demo runs it on demand); walks every patient's
//! active medications and sends a message from the prescribing doctor for
//! each schedule slot that has come due today and has not been reminded yet.
//! Sends are deduplicated through the store's persisted reminder map, keyed
//! `"{medication_id}:{HH:MM}:{YYYY-MM-DD}"`, so re-running the sweep within
//! the same day sends nothing new.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use carelink_contracts::error::StoreResult;
use carelink_contracts::message::{Message, NewMessage};

use carelink_store::RecordStore;

/// Send every due, not-yet-sent reminder as of `now`.
///
/// `now` is passed in rather than read from the clock so sweeps are
/// reproducible; callers normally pass `Utc::now()`.
pub fn run_reminder_sweep(store: &RecordStore, now: DateTime<Utc>) -> StoreResult<Vec<Message>> {
    let today = now.date_naive();
    let cutoff = now.time();
    let mut sent = Vec::new();

    for patient in store.list_patients() {
        let Some(user) = &patient.user else {
            debug!(patient_id = %patient.profile.id, "patient account deleted; reminders skipped");
            continue;
        };

        for view in store.medications_for_patient(patient.profile.id) {
            let medication = view.medication;
            if !medication.in_effect_on(today) {
                continue;
            }

            for slot in &medication.schedule {
                if *slot > cutoff {
                    continue;
                }
                let dedupe_key = format!(
                    "{}:{}:{}",
                    medication.id,
                    slot.format("%H:%M"),
                    today.format("%Y-%m-%d")
                );
                if store.reminder_sent(&dedupe_key) {
                    continue;
                }

                let message = store.send_message(NewMessage {
                    sender_id: medication.prescribed_by,
                    recipient_id: user.id,
                    content: format!(
                        "Medication reminder: {} {} ({} dose)",
                        medication.name,
                        medication.dosage,
                        slot.format("%H:%M")
                    ),
                    image_data: None,
                })?;
                store.mark_reminder_sent(&dedupe_key, now)?;

                debug!(
                    medication_id = %medication.id,
                    patient_id = %patient.profile.id,
                    slot = %slot.format("%H:%M"),
                    "reminder sent"
                );
                sent.push(message);
            }
        }
    }

    info!(sent = sent.len(), "reminder sweep complete");
    Ok(sent)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
