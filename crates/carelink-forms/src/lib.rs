//! # carelink-forms
//!
//! Dynamic form-schema compilation and response validation.
//!
//! Doctors author small forms as `Vec<FormField>` (on tasks and on patient
//! daily-record profiles).  This crate compiles a field list into a JSON
//! Schema document and validates a response map against it in two phases:
//!
//! 1. **Structural** — the response map is validated against the compiled
//!    schema using the `jsonschema` crate: unknown fields, missing required
//!    fields, wrong value types, and values outside a select's option list.
//! 2. **Semantic** — date fields that survive the structural pass are parsed
//!    as real calendar dates, so `"2026-13-40"` fails even though it matches
//!    the structural pattern.
//!
//! All violations are collected before returning so callers see the full
//! failure set in one pass.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use carelink_contracts::form::{FieldKind, FormField};

/// Structural pattern for date fields; real-date parsing happens in the
/// semantic phase.
const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

/// One validation failure, named by the offending field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormViolation {
    /// The field name, or `(root)` for map-level failures such as an
    /// unknown field.
    pub field: String,
    pub message: String,
}

/// The outcome of validating one response map.
#[derive(Debug, Clone, Default)]
pub struct FormReport {
    pub violations: Vec<FormViolation>,
}

impl FormReport {
    /// True when no violation was recorded.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// The first violation's message, for callers that surface a single
    /// inline error.
    pub fn first_message(&self) -> Option<&str> {
        self.violations.first().map(|v| v.message.as_str())
    }
}

// ── Schema compilation ────────────────────────────────────────────────────────

/// Compile a field list into a JSON Schema document.
///
/// The schema is a closed object: every response key must correspond to a
/// declared field (`additionalProperties: false`), and every `required`
/// field must be present.
pub fn compile_schema(fields: &[FormField]) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();

    for field in fields {
        let constraint = match &field.kind {
            FieldKind::Text => json!({ "type": "string" }),
            FieldKind::Number => json!({ "type": "number" }),
            FieldKind::Select { options } => json!({ "enum": options }),
            FieldKind::Checkbox => json!({ "type": "boolean" }),
            FieldKind::Date => json!({ "type": "string", "pattern": DATE_PATTERN }),
        };
        properties.insert(field.name.clone(), constraint);
        if field.required {
            required.push(Value::String(field.name.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

// ── Response validation ───────────────────────────────────────────────────────

/// Validate `responses` against the form described by `fields`.
///
/// Never fails outright — a form definition the schema compiler cannot
/// handle is reported as a single violation so the caller can still render
/// something, mirroring how the rest of the system degrades rather than
/// crashes.
pub fn validate_responses(fields: &[FormField], responses: &Map<String, Value>) -> FormReport {
    let schema = compile_schema(fields);
    let payload = Value::Object(responses.clone());
    let mut report = FormReport::default();

    // ── Phase 1: JSON Schema structural validation ────────────────────────
    match jsonschema::validator_for(&schema) {
        Ok(validator) => {
            for error in validator.iter_errors(&payload) {
                let field = field_name_of(&error.instance_path.to_string());
                let message = format!("{}: {}", field, error);
                warn!(%field, %message, "form response failed structural validation");
                report.violations.push(FormViolation { field, message });
            }
        }
        Err(e) => {
            let message = format!("form definition produced an invalid schema: {e}");
            warn!(%message, "form schema compilation failure");
            report.violations.push(FormViolation {
                field: "(root)".to_string(),
                message,
            });
        }
    }

    // ── Phase 2: real-date parsing for date fields ────────────────────────
    for field in fields {
        if !matches!(field.kind, FieldKind::Date) {
            continue;
        }
        let Some(Value::String(raw)) = responses.get(&field.name) else {
            continue; // absent or non-string — phase 1 already covered it
        };
        if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
            let message = format!("{}: '{}' is not a valid calendar date", field.name, raw);
            warn!(field = %field.name, %message, "form response failed date validation");
            report.violations.push(FormViolation {
                field: field.name.clone(),
                message,
            });
        }
    }

    debug!(
        field_count = fields.len(),
        passed = report.passed(),
        violation_count = report.violations.len(),
        "form validation complete"
    );

    report
}

/// Extract a display field name from a JSON pointer instance path.
fn field_name_of(instance_path: &str) -> String {
    let trimmed = instance_path.trim_start_matches('/');
    if trimmed.is_empty() {
        "(root)".to_string()
    } else {
        trimmed.to_string()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use carelink_contracts::form::{FieldKind, FormField};

    use super::{compile_schema, validate_responses};

    // ── Builder helpers ───────────────────────────────────────────────────────

    fn daily_form() -> Vec<FormField> {
        vec![
            FormField::required("mood", "Mood today", FieldKind::Select {
                options: vec!["good".to_string(), "okay".to_string(), "low".to_string()],
            }),
            FormField::required("slept_well", "Slept well?", FieldKind::Checkbox),
            FormField::optional("weight_kg", "Weight (kg)", FieldKind::Number),
            FormField::optional("next_visit", "Preferred next visit", FieldKind::Date),
            FormField::optional("comments", "Anything else?", FieldKind::Text),
        ]
    }

    fn responses(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("test responses must be an object")
    }

    // ── Schema compilation ────────────────────────────────────────────────────

    #[test]
    fn compiled_schema_is_a_closed_object_with_required_fields() {
        let schema = compile_schema(&daily_form());

        assert_eq!(schema["type"], json!("object"));
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["required"], json!(["mood", "slept_well"]));
        assert_eq!(schema["properties"]["weight_kg"]["type"], json!("number"));
        assert_eq!(
            schema["properties"]["mood"]["enum"],
            json!(["good", "okay", "low"])
        );
    }

    // ── Validation outcomes ───────────────────────────────────────────────────

    #[test]
    fn complete_valid_responses_pass() {
        let report = validate_responses(
            &daily_form(),
            &responses(json!({
                "mood": "okay",
                "slept_well": true,
                "weight_kg": 62.5,
                "next_visit": "2026-09-01",
                "comments": "feeling better"
            })),
        );

        assert!(report.passed(), "violations: {:?}", report.violations);
    }

    #[test]
    fn missing_required_field_is_reported() {
        let report = validate_responses(
            &daily_form(),
            &responses(json!({ "mood": "good" })),
        );

        assert!(!report.passed());
        assert!(
            report.violations.iter().any(|v| v.message.contains("slept_well")),
            "violations should name the missing field: {:?}",
            report.violations
        );
    }

    #[test]
    fn unknown_field_is_reported() {
        let report = validate_responses(
            &daily_form(),
            &responses(json!({
                "mood": "good",
                "slept_well": false,
                "shoe_size": 42
            })),
        );

        assert!(!report.passed());
    }

    #[test]
    fn select_value_outside_options_is_reported() {
        let report = validate_responses(
            &daily_form(),
            &responses(json!({ "mood": "fantastic", "slept_well": true })),
        );

        assert!(!report.passed());
        assert!(report.violations.iter().any(|v| v.field == "mood"));
    }

    #[test]
    fn wrong_type_is_reported() {
        let report = validate_responses(
            &daily_form(),
            &responses(json!({
                "mood": "good",
                "slept_well": "yes",
                "weight_kg": "sixty"
            })),
        );

        assert!(!report.passed());
        // Both the checkbox and the number field are wrong; all violations
        // are collected in one pass.
        assert!(report.violations.len() >= 2, "violations: {:?}", report.violations);
    }

    #[test]
    fn structurally_plausible_but_impossible_date_is_reported() {
        let report = validate_responses(
            &daily_form(),
            &responses(json!({
                "mood": "good",
                "slept_well": true,
                "next_visit": "2026-13-40"
            })),
        );

        assert!(!report.passed());
        assert!(report.violations.iter().any(|v| v.field == "next_visit"));
        assert!(
            report.first_message().is_some(),
            "first_message should surface the inline error"
        );
    }

    #[test]
    fn empty_form_accepts_empty_responses() {
        let report = validate_responses(&[], &Map::new());
        assert!(report.passed());
    }
}
