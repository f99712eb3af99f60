//! PHQ-9 mental-health assessments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// PHQ-9 severity bucket, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

impl Severity {
    /// Map a PHQ-9 total (0–27) to its severity bucket.
    ///
    /// Standard cutoffs: ≥20 severe, ≥15 moderately severe, ≥10 moderate,
    /// ≥5 mild, else minimal.
    pub fn from_total(total: u8) -> Self {
        match total {
            20.. => Severity::Severe,
            15..=19 => Severity::ModeratelySevere,
            10..=14 => Severity::Moderate,
            5..=9 => Severity::Mild,
            _ => Severity::Minimal,
        }
    }

    /// Display label used in messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Minimal => "minimal",
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::ModeratelySevere => "moderately severe",
            Severity::Severe => "severe",
        }
    }
}

/// One scored PHQ-9 questionnaire snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentalAssessment {
    pub id: Uuid,
    /// The `PatientProfile` this assessment belongs to.
    pub patient_id: Uuid,
    /// The nine raw answers, each 0–3.
    pub answers: Vec<u8>,
    /// Sum of the answers, 0–27.
    pub total_score: u8,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
