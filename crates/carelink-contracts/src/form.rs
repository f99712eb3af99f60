//! Dynamic form schemas.
//!
//! Doctors attach small custom forms to tasks and to a patient's daily
//! record: a list of `FormField`s describing what the patient (or volunteer)
//! must fill in.  Responses are free-form JSON maps keyed by field name;
//! validation of a response map against its field list lives in
//! `carelink-forms`.

use serde::{Deserialize, Serialize};

/// The value shape a form field accepts.
///
/// Serialized internally tagged so a field's wire form reads
/// `{ "name": "...", "kind": "select", "options": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// A JSON number.
    Number,
    /// One value out of a fixed option list.
    Select { options: Vec<String> },
    /// A boolean toggle.
    Checkbox,
    /// A calendar date in `YYYY-MM-DD` form.
    Date,
}

/// One field of a doctor-authored dynamic form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Response-map key. Unique within one form.
    pub name: String,
    /// Human-readable prompt shown to the person filling the form in.
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FormField {
    /// Convenience constructor for a required field.
    pub fn required(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: true,
        }
    }

    /// Convenience constructor for an optional field.
    pub fn optional(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
        }
    }
}
