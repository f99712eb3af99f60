//! TOML-configurable vital-sign thresholds.
//!
//! Every deployment starts from the built-in defaults; a site can override
//! any subset of values with a small TOML file:
//!
//! ```toml
//! temperature_high_f = 99.5
//! oxygen_low = 94.0
//! ```
//!
//! Construct via `from_toml_str` or `from_file`, or take `Default::default()`
//! when no file is configured.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use carelink_contracts::error::{StoreError, StoreResult};

/// The full threshold set used by vital-sign evaluation.
///
/// Temperatures are in °F (free-text Celsius readings are converted before
/// comparison), pressures in mmHg, blood sugar in mg/dL, oxygen saturation
/// in percent, pain and fatigue on the 0–10 self-report scale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriageThresholds {
    /// Flag at or above.
    pub temperature_high_f: f64,
    /// Escalate to urgent at or above.
    pub temperature_urgent_f: f64,
    /// Flag at or above.
    pub pulse_high: f64,
    /// Flag at or below.
    pub pulse_low: f64,
    /// Flag at or above.
    pub systolic_high: f64,
    /// Flag at or below.
    pub systolic_low: f64,
    /// Flag at or above.
    pub diastolic_high: f64,
    /// Flag at or below.
    pub diastolic_low: f64,
    /// Flag at or above.
    pub blood_sugar_high: f64,
    /// Flag strictly below.
    pub oxygen_low: f64,
    /// Escalate to urgent strictly below.
    pub oxygen_urgent: f64,
    /// Flag at or above.
    pub pain_high: f64,
    /// Flag at or above.
    pub fatigue_high: f64,
}

impl Default for TriageThresholds {
    fn default() -> Self {
        Self {
            temperature_high_f: 100.4,
            temperature_urgent_f: 103.0,
            pulse_high: 110.0,
            pulse_low: 50.0,
            systolic_high: 140.0,
            systolic_low: 90.0,
            diastolic_high: 90.0,
            diastolic_low: 60.0,
            blood_sugar_high: 200.0,
            oxygen_low: 92.0,
            oxygen_urgent: 90.0,
            pain_high: 8.0,
            fatigue_high: 8.0,
        }
    }
}

impl TriageThresholds {
    /// Parse `s` as a TOML threshold override file.
    ///
    /// Missing keys keep their defaults; unknown keys are rejected so a typo
    /// cannot silently leave a default in place.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        let thresholds: TriageThresholds = toml::from_str(s).map_err(|e| {
            StoreError::validation(format!("failed to parse triage thresholds TOML: {}", e))
        })?;
        Ok(thresholds)
    }

    /// Read the file at `path` and parse it as a threshold override file.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::storage(format!(
                "failed to read thresholds file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let thresholds = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "triage thresholds loaded");
        Ok(thresholds)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::TriageThresholds;

    #[test]
    fn empty_toml_yields_defaults() {
        let thresholds = TriageThresholds::from_toml_str("").unwrap();
        assert_eq!(thresholds, TriageThresholds::default());
        assert_eq!(thresholds.temperature_high_f, 100.4);
        assert_eq!(thresholds.oxygen_low, 92.0);
    }

    #[test]
    fn partial_override_keeps_the_rest() {
        let thresholds = TriageThresholds::from_toml_str(
            r#"
            temperature_high_f = 99.5
            oxygen_low = 94.0
            "#,
        )
        .unwrap();

        assert_eq!(thresholds.temperature_high_f, 99.5);
        assert_eq!(thresholds.oxygen_low, 94.0);
        assert_eq!(thresholds.pulse_high, 110.0);
        assert_eq!(thresholds.blood_sugar_high, 200.0);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = TriageThresholds::from_toml_str("temprature_high_f = 99.5");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("failed to parse triage thresholds"));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(TriageThresholds::from_toml_str("temperature_high_f = ").is_err());
    }
}
