//! Vital-sign evaluation over free-text readings.
//!
//! Patients type whatever they like ("38.2 C", "pulse about 115", "120/80");
//! evaluation extracts the first numeric token from each field, normalizes
//! temperature to °F, and compares against the configured thresholds.
//! Unparseable text produces no flag.

use tracing::debug;

use carelink_contracts::clinical::Vitals;
use carelink_contracts::task::Priority;

use crate::thresholds::TriageThresholds;

/// The outcome of evaluating one vitals submission.
#[derive(Debug, Clone, PartialEq)]
pub struct VitalsReview {
    /// Human-readable flag strings, one per breached threshold.
    pub flags: Vec<String>,
    /// Follow-up priority when any flag fired: `Urgent` when an escalation
    /// rule matched, otherwise `High`. `None` when clear.
    pub follow_up: Option<Priority>,
}

impl VitalsReview {
    /// True when no threshold was breached.
    pub fn is_clear(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Scan for the first numeric token in `text`. Returns the value and the
/// byte offset just past the token.
fn scan_number(text: &str) -> Option<(f64, usize)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            let mut seen_dot = false;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || (bytes[i] == b'.' && !seen_dot))
            {
                seen_dot |= bytes[i] == b'.';
                i += 1;
            }
            return text[start..i].parse().ok().map(|value| (value, i));
        }
        i += 1;
    }
    None
}

/// The first numeric token (digits with an optional decimal point) in `text`.
pub fn first_number(text: &str) -> Option<f64> {
    scan_number(text).map(|(value, _)| value)
}

/// The first two numeric tokens in `text`, for "systolic/diastolic" readings.
pub fn first_two_numbers(text: &str) -> Option<(f64, f64)> {
    let (first, end) = scan_number(text)?;
    let (second, _) = scan_number(&text[end..])?;
    Some((first, second))
}

/// Normalize a temperature reading to °F. Values below 50 are taken as °C.
fn temperature_to_fahrenheit(value: f64) -> f64 {
    if value < 50.0 {
        value * 9.0 / 5.0 + 32.0
    } else {
        value
    }
}

/// Evaluate `vitals` against `thresholds`.
pub fn evaluate_vitals(vitals: &Vitals, thresholds: &TriageThresholds) -> VitalsReview {
    let mut flags = Vec::new();
    let mut urgent = false;

    if let Some(temp) = vitals.temperature.as_deref().and_then(first_number) {
        let temp_f = temperature_to_fahrenheit(temp);
        if temp_f >= thresholds.temperature_urgent_f {
            flags.push(format!("temperature {:.1}°F is critically high", temp_f));
            urgent = true;
        } else if temp_f >= thresholds.temperature_high_f {
            flags.push(format!("temperature {:.1}°F is high", temp_f));
        }
    }

    if let Some(pulse) = vitals.pulse.as_deref().and_then(first_number) {
        if pulse >= thresholds.pulse_high {
            flags.push(format!("pulse {:.0} bpm is high", pulse));
        } else if pulse <= thresholds.pulse_low {
            flags.push(format!("pulse {:.0} bpm is low", pulse));
        }
    }

    if let Some((systolic, diastolic)) =
        vitals.blood_pressure.as_deref().and_then(first_two_numbers)
    {
        if systolic >= thresholds.systolic_high {
            flags.push(format!("systolic pressure {:.0} is high", systolic));
        } else if systolic <= thresholds.systolic_low {
            flags.push(format!("systolic pressure {:.0} is low", systolic));
        }
        if diastolic >= thresholds.diastolic_high {
            flags.push(format!("diastolic pressure {:.0} is high", diastolic));
        } else if diastolic <= thresholds.diastolic_low {
            flags.push(format!("diastolic pressure {:.0} is low", diastolic));
        }
    }

    if let Some(sugar) = vitals.blood_sugar.as_deref().and_then(first_number) {
        if sugar >= thresholds.blood_sugar_high {
            flags.push(format!("blood sugar {:.0} mg/dL is high", sugar));
        }
    }

    if let Some(oxygen) = vitals.oxygen_saturation.as_deref().and_then(first_number) {
        if oxygen < thresholds.oxygen_urgent {
            flags.push(format!("oxygen saturation {:.0}% is critically low", oxygen));
            urgent = true;
        } else if oxygen < thresholds.oxygen_low {
            flags.push(format!("oxygen saturation {:.0}% is low", oxygen));
        }
    }

    if let Some(pain) = vitals.pain_level.as_deref().and_then(first_number) {
        if pain >= thresholds.pain_high {
            flags.push(format!("pain level {:.0} is severe", pain));
        }
    }

    if let Some(fatigue) = vitals.fatigue_level.as_deref().and_then(first_number) {
        if fatigue >= thresholds.fatigue_high {
            flags.push(format!("fatigue level {:.0} is severe", fatigue));
        }
    }

    let follow_up = if flags.is_empty() {
        None
    } else if urgent {
        Some(Priority::Urgent)
    } else {
        Some(Priority::High)
    };

    debug!(flag_count = flags.len(), urgent, "vitals evaluated");
    VitalsReview { flags, follow_up }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use carelink_contracts::clinical::Vitals;
    use carelink_contracts::task::Priority;

    use super::{evaluate_vitals, first_number, first_two_numbers, VitalsReview};
    use crate::thresholds::TriageThresholds;

    fn eval(vitals: Vitals) -> VitalsReview {
        evaluate_vitals(&vitals, &TriageThresholds::default())
    }

    #[test]
    fn extraction_finds_numbers_buried_in_text() {
        assert_eq!(first_number("pulse about 115 bpm"), Some(115.0));
        assert_eq!(first_number("38.2 C this morning"), Some(38.2));
        assert_eq!(first_number("feels normal"), None);
        assert_eq!(first_two_numbers("bp 120 / 80 after rest"), Some((120.0, 80.0)));
        assert_eq!(first_two_numbers("120 only"), None);
    }

    #[test]
    fn temperature_boundary_flags_at_exactly_the_threshold() {
        let hot = eval(Vitals {
            temperature: Some("100.4".to_string()),
            ..Default::default()
        });
        assert_eq!(hot.flags, vec!["temperature 100.4°F is high"]);
        assert_eq!(hot.follow_up, Some(Priority::High));

        let fine = eval(Vitals {
            temperature: Some("100.3".to_string()),
            ..Default::default()
        });
        assert!(fine.is_clear());
        assert_eq!(fine.follow_up, None);
    }

    #[test]
    fn celsius_readings_are_converted_before_comparison() {
        // 38.0 °C is exactly 100.4 °F.
        let review = eval(Vitals {
            temperature: Some("38.0 C".to_string()),
            ..Default::default()
        });
        assert_eq!(review.flags, vec!["temperature 100.4°F is high"]);
    }

    #[test]
    fn pulse_boundaries() {
        let high = eval(Vitals {
            pulse: Some("110".to_string()),
            ..Default::default()
        });
        assert_eq!(high.flags, vec!["pulse 110 bpm is high"]);

        let fine = eval(Vitals {
            pulse: Some("109".to_string()),
            ..Default::default()
        });
        assert!(fine.is_clear());

        let low = eval(Vitals {
            pulse: Some("48".to_string()),
            ..Default::default()
        });
        assert_eq!(low.flags, vec!["pulse 48 bpm is low"]);
    }

    #[test]
    fn oxygen_is_strictly_below_and_escalates_under_ninety() {
        assert!(eval(Vitals {
            oxygen_saturation: Some("92".to_string()),
            ..Default::default()
        })
        .is_clear());

        let low = eval(Vitals {
            oxygen_saturation: Some("91".to_string()),
            ..Default::default()
        });
        assert_eq!(low.flags, vec!["oxygen saturation 91% is low"]);
        assert_eq!(low.follow_up, Some(Priority::High));

        let critical = eval(Vitals {
            oxygen_saturation: Some("89".to_string()),
            ..Default::default()
        });
        assert_eq!(critical.flags, vec!["oxygen saturation 89% is critically low"]);
        assert_eq!(critical.follow_up, Some(Priority::Urgent));
    }

    #[test]
    fn high_fever_escalates_to_urgent() {
        let review = eval(Vitals {
            temperature: Some("103.0".to_string()),
            ..Default::default()
        });
        assert_eq!(review.flags, vec!["temperature 103.0°F is critically high"]);
        assert_eq!(review.follow_up, Some(Priority::Urgent));
    }

    #[test]
    fn blood_pressure_flags_both_numbers_independently() {
        let review = eval(Vitals {
            blood_pressure: Some("150/95".to_string()),
            ..Default::default()
        });
        assert_eq!(
            review.flags,
            vec!["systolic pressure 150 is high", "diastolic pressure 95 is high"]
        );
    }

    #[test]
    fn remaining_thresholds_fire_at_their_defaults() {
        let review = eval(Vitals {
            blood_sugar: Some("210 after lunch".to_string()),
            pain_level: Some("8/10".to_string()),
            fatigue_level: Some("9".to_string()),
            ..Default::default()
        });
        assert_eq!(
            review.flags,
            vec![
                "blood sugar 210 mg/dL is high",
                "pain level 8 is severe",
                "fatigue level 9 is severe"
            ]
        );
    }

    #[test]
    fn unparseable_text_produces_no_flag() {
        let review = eval(Vitals {
            temperature: Some("felt warm".to_string()),
            pulse: Some("normal".to_string()),
            blood_pressure: Some("ok".to_string()),
            ..Default::default()
        });
        assert!(review.is_clear());
    }
}
