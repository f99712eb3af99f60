//! Task and appointment operations.
//!
//! Store-enforced invariants:
//!
//! - the transition into `Completed` stamps `completed_at` once;
//!   re-asserting `Completed` leaves the stamp untouched;
//! - a task can never hold `Completed` with an empty report (the report gate
//!   is a store rule, not a view-layer patch);
//! - only appointments carry a schedule — rescheduling a to-do is rejected.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use carelink_contracts::error::{StoreError, StoreResult};
use carelink_contracts::task::{NewTask, Task, TaskKind, TaskStatus, TaskUpdate};

use crate::backend::keys;
use crate::store::{touch_after, RecordStore, State};
use crate::views::TaskView;

impl RecordStore {
    /// Create a task. Status starts at `Pending`.
    pub fn create_task(&self, new: NewTask) -> StoreResult<Task> {
        if new.title.trim().is_empty() {
            return Err(StoreError::validation("task title is required"));
        }

        let mut state = self.lock();
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            kind: new.kind,
            title: new.title,
            description: new.description,
            status: TaskStatus::Pending,
            priority: new.priority,
            assigned_to: new.assigned_to,
            assigned_by: new.assigned_by,
            form_fields: new.form_fields,
            form_responses: None,
            report: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        state.data.tasks.push(task.clone());
        self.persist(keys::TASKS, &state.data.tasks)?;

        info!(task_id = %task.id, title = %task.title, "task created");
        Ok(task)
    }

    /// Joined lookup; `None` when the task does not exist.
    pub fn task_by_id(&self, id: Uuid) -> Option<TaskView> {
        let state = self.lock();
        state
            .data
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .map(|t| task_view(&state, t))
    }

    /// Every task, joined, newest first.
    pub fn list_tasks(&self) -> Vec<TaskView> {
        let state = self.lock();
        let mut tasks = state.data.tasks.clone();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks.into_iter().map(|t| task_view(&state, t)).collect()
    }

    /// Tasks assigned to one user, joined, newest first.
    pub fn tasks_for_user(&self, user_id: Uuid) -> Vec<TaskView> {
        self.list_tasks()
            .into_iter()
            .filter(|v| v.task.assigned_to == user_id)
            .collect()
    }

    /// Every appointment, joined, in schedule order.
    pub fn list_appointments(&self) -> Vec<TaskView> {
        let state = self.lock();
        let mut appointments: Vec<Task> = state
            .data
            .tasks
            .iter()
            .filter(|t| matches!(t.kind, TaskKind::Appointment { .. }))
            .cloned()
            .collect();
        appointments.sort_by_key(|t| t.kind.scheduled_at());
        appointments
            .into_iter()
            .map(|t| task_view(&state, t))
            .collect()
    }

    /// One patient's appointments, joined, in schedule order.
    pub fn appointments_for_patient(&self, patient_id: Uuid) -> Vec<TaskView> {
        self.list_appointments()
            .into_iter()
            .filter(|v| v.task.kind.patient_id() == Some(patient_id))
            .collect()
    }

    /// Merge `update` over the task, enforcing the status invariants.
    pub fn update_task(&self, id: Uuid, update: TaskUpdate) -> StoreResult<Task> {
        let mut state = self.lock();
        let index = state
            .data
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("task", id))?;

        let mut task = state.data.tasks[index].clone();
        let prev_status = task.status;

        if let Some(scheduled_at) = update.scheduled_at {
            match &mut task.kind {
                TaskKind::Appointment {
                    scheduled_at: slot, ..
                } => *slot = scheduled_at,
                TaskKind::Todo => {
                    return Err(StoreError::validation(
                        "only appointments carry a schedule",
                    ))
                }
            }
        }
        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = Some(description);
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(assigned_to) = update.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(report) = update.report {
            task.report = Some(report);
        }
        if let Some(status) = update.status {
            task.status = status;
        }

        // Report gate: no stored task may be completed without a report.
        if task.status == TaskStatus::Completed && !task.has_report() {
            return Err(StoreError::validation(
                "a task cannot be completed without a non-empty report",
            ));
        }

        let now = touch_after(task.updated_at);
        if task.status == TaskStatus::Completed && prev_status != TaskStatus::Completed {
            task.completed_at = Some(now);
            info!(task_id = %task.id, "task completed");
        }
        task.updated_at = now;

        state.data.tasks[index] = task.clone();
        self.persist(keys::TASKS, &state.data.tasks)?;

        debug!(task_id = %task.id, status = ?task.status, "task updated");
        Ok(task)
    }

    /// The sanctioned completion path: attach the report and complete in one
    /// step.
    pub fn complete_task(&self, id: Uuid, report: impl Into<String>) -> StoreResult<Task> {
        let report = report.into();
        if report.trim().is_empty() {
            return Err(StoreError::validation(
                "a task cannot be completed without a non-empty report",
            ));
        }
        self.update_task(
            id,
            TaskUpdate {
                status: Some(TaskStatus::Completed),
                report: Some(report),
                ..Default::default()
            },
        )
    }

    /// Validate `responses` against the task's form and record them.
    pub fn submit_task_form(
        &self,
        id: Uuid,
        responses: Map<String, Value>,
    ) -> StoreResult<Task> {
        let mut state = self.lock();
        let index = state
            .data
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("task", id))?;

        let task = &state.data.tasks[index];
        if task.form_fields.is_empty() {
            return Err(StoreError::validation("task has no form to submit"));
        }

        let report = carelink_forms::validate_responses(&task.form_fields, &responses);
        if !report.passed() {
            return Err(StoreError::validation(format!(
                "form response rejected: {}",
                report.first_message().unwrap_or("invalid responses")
            )));
        }

        let mut task = task.clone();
        task.form_responses = Some(responses);
        task.updated_at = touch_after(task.updated_at);

        state.data.tasks[index] = task.clone();
        self.persist(keys::TASKS, &state.data.tasks)?;

        debug!(task_id = %task.id, "task form responses recorded");
        Ok(task)
    }

    /// Hard delete, no cascade.
    pub fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        let before = state.data.tasks.len();
        state.data.tasks.retain(|t| t.id != id);
        if state.data.tasks.len() == before {
            return Err(StoreError::not_found("task", id));
        }
        self.persist(keys::TASKS, &state.data.tasks)?;
        info!(task_id = %id, "task deleted");
        Ok(())
    }
}

// ── Join helper ───────────────────────────────────────────────────────────────

fn task_view(state: &State, task: Task) -> TaskView {
    let assigned_to_user = state.user_by_id(task.assigned_to);
    let assigned_by_user = state.user_by_id(task.assigned_by);
    let patient = task.kind.patient_id().and_then(|id| state.patient_by_id(id));
    TaskView {
        task,
        assigned_to_user,
        assigned_by_user,
        patient,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::{json, Map, Value};

    use carelink_contracts::form::{FieldKind, FormField};
    use carelink_contracts::task::{NewTask, TaskStatus, TaskUpdate};
    use carelink_contracts::user::{Role, UserUpdate};

    use crate::testutil::{new_appointment, new_patient, new_todo, new_user, open_store};

    fn responses(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn completion_stamps_completed_at_once() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Volunteer, "V", "v@example.org")).unwrap();
        let task = store.create_task(new_todo(user.id, user.id, "restock kit")).unwrap();
        assert_eq!(task.completed_at, None);

        let before = Utc::now();
        let completed = store.complete_task(task.id, "kit restocked").unwrap();
        let stamp = completed.completed_at.expect("completed_at stamped");
        assert!(stamp >= before);
        assert_eq!(completed.status, TaskStatus::Completed);

        // Re-asserting completed must not move the stamp.
        let again = store
            .update_task(
                task.id,
                TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(again.completed_at, Some(stamp));
    }

    #[test]
    fn report_gate_rejects_completion_without_a_report() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Volunteer, "V", "v@example.org")).unwrap();
        let task = store.create_task(new_todo(user.id, user.id, "visit")).unwrap();

        let err = store
            .update_task(
                task.id,
                TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.to_string().contains("non-empty report"));

        let err = store.complete_task(task.id, "   ").unwrap_err();
        assert!(err.to_string().contains("non-empty report"));

        // The stored task is untouched by the rejected updates.
        let stored = store.task_by_id(task.id).unwrap().task;
        assert_eq!(stored.status, TaskStatus::Pending);
        assert_eq!(stored.updated_at, task.updated_at);
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Volunteer, "V", "v@example.org")).unwrap();
        let task = store.create_task(new_todo(user.id, user.id, "visit")).unwrap();

        let updated = store
            .update_task(
                task.id,
                TaskUpdate {
                    description: Some("bring the blood pressure cuff".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, task.title);
        assert_eq!(updated.status, task.status);
        assert_eq!(updated.created_at, task.created_at);
        assert!(updated.updated_at > task.updated_at);
        assert_eq!(
            updated.description.as_deref(),
            Some("bring the blood pressure cuff")
        );
    }

    #[test]
    fn rescheduling_a_todo_is_rejected() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Volunteer, "V", "v@example.org")).unwrap();
        let task = store.create_task(new_todo(user.id, user.id, "visit")).unwrap();

        let err = store
            .update_task(
                task.id,
                TaskUpdate {
                    scheduled_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.to_string().contains("only appointments"));
    }

    #[test]
    fn appointments_list_in_schedule_order_with_patient_join() {
        let store = open_store();
        let volunteer = store.sign_up(new_user(Role::Volunteer, "V", "v@example.org")).unwrap();
        let patient_user = store.sign_up(new_user(Role::Patient, "P", "p@example.org")).unwrap();
        let profile = store.create_patient(new_patient(patient_user.id)).unwrap();

        store
            .create_task(new_appointment(volunteer.id, volunteer.id, profile.id, "later", 20))
            .unwrap();
        store
            .create_task(new_appointment(volunteer.id, volunteer.id, profile.id, "sooner", 5))
            .unwrap();
        store.create_task(new_todo(volunteer.id, volunteer.id, "not a visit")).unwrap();

        let appointments = store.list_appointments();
        assert_eq!(appointments.len(), 2);
        assert_eq!(appointments[0].task.title, "sooner");
        assert_eq!(appointments[1].task.title, "later");
        assert_eq!(
            appointments[0].patient.as_ref().map(|p| p.id),
            Some(profile.id)
        );

        assert_eq!(store.appointments_for_patient(profile.id).len(), 2);
    }

    #[test]
    fn joins_are_fresh_not_cached_at_creation() {
        let store = open_store();
        let volunteer = store.sign_up(new_user(Role::Volunteer, "Old", "v@example.org")).unwrap();
        let task = store.create_task(new_todo(volunteer.id, volunteer.id, "visit")).unwrap();

        store
            .update_user(
                volunteer.id,
                UserUpdate {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let view = store.task_by_id(task.id).unwrap();
        assert_eq!(view.assigned_to_user.unwrap().name, "Renamed");
    }

    #[test]
    fn deleting_the_assignee_leaves_the_task_with_a_dangling_join() {
        let store = open_store();
        let volunteer = store.sign_up(new_user(Role::Volunteer, "V", "v@example.org")).unwrap();
        let task = store.create_task(new_todo(volunteer.id, volunteer.id, "visit")).unwrap();

        store.delete_user(volunteer.id).unwrap();

        let view = store.task_by_id(task.id).unwrap();
        assert_eq!(view.assigned_to_user, None);
        assert_eq!(view.task.assigned_to, volunteer.id);
    }

    #[test]
    fn form_submission_validates_before_recording() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Volunteer, "V", "v@example.org")).unwrap();
        let task = store
            .create_task(NewTask {
                form_fields: vec![FormField::required(
                    "visited",
                    "Did the visit happen?",
                    FieldKind::Checkbox,
                )],
                ..new_todo(user.id, user.id, "home visit")
            })
            .unwrap();

        let err = store
            .submit_task_form(task.id, responses(json!({ "visited": "yes" })))
            .unwrap_err();
        assert!(err.to_string().contains("form response rejected"));

        let recorded = store
            .submit_task_form(task.id, responses(json!({ "visited": true })))
            .unwrap();
        assert_eq!(
            recorded.form_responses.unwrap().get("visited"),
            Some(&json!(true))
        );
    }

    #[test]
    fn submitting_against_a_formless_task_is_rejected() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Volunteer, "V", "v@example.org")).unwrap();
        let task = store.create_task(new_todo(user.id, user.id, "visit")).unwrap();

        let err = store.submit_task_form(task.id, Map::new()).unwrap_err();
        assert!(err.to_string().contains("no form"));
    }

    #[test]
    fn delete_leaves_no_trace_in_lists() {
        let store = open_store();
        let user = store.sign_up(new_user(Role::Volunteer, "V", "v@example.org")).unwrap();
        let task = store.create_task(new_todo(user.id, user.id, "visit")).unwrap();

        store.delete_task(task.id).unwrap();
        assert!(store.list_tasks().is_empty());
        assert!(store.delete_task(task.id).unwrap_err().is_not_found());
    }
}
