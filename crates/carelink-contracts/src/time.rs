//! Serde helpers for clock-time fields.
//!
//! Medication schedules are lists of `HH:MM` wall-clock slots.  The persisted
//! form must stay exactly `"08:00"` (not chrono's default `"08:00:00"`), so
//! the slot fields use these `with`-modules.

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serializer};

/// The wire format for schedule slots.
pub const HHMM_FORMAT: &str = "%H:%M";

/// Serde `with`-module for a bare `NaiveTime` in `HH:MM` form.
pub mod hhmm {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&time.format(HHMM_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(de)?;
        NaiveTime::parse_from_str(&raw, HHMM_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Serde `with`-module for `Vec<NaiveTime>` in `HH:MM` form.
pub mod hhmm_list {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(times: &[NaiveTime], ser: S) -> Result<S::Ok, S::Error> {
        let mut seq = ser.serialize_seq(Some(times.len()))?;
        for t in times {
            seq.serialize_element(&t.format(HHMM_FORMAT).to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<NaiveTime>, D::Error> {
        let raw: Vec<String> = Vec::deserialize(de)?;
        raw.iter()
            .map(|s| NaiveTime::parse_from_str(s, HHMM_FORMAT).map_err(serde::de::Error::custom))
            .collect()
    }
}

/// Serde `with`-module for `Option<NaiveTime>` in `HH:MM` form.
pub mod hhmm_opt {
    use super::*;

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, ser: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => ser.serialize_some(&t.format(HHMM_FORMAT).to_string()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(de)?;
        raw.map(|s| NaiveTime::parse_from_str(&s, HHMM_FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Serde `with`-module for `Option<Vec<NaiveTime>>` in `HH:MM` form.
pub mod hhmm_list_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        times: &Option<Vec<NaiveTime>>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        match times {
            Some(list) => {
                let raw: Vec<String> =
                    list.iter().map(|t| t.format(HHMM_FORMAT).to_string()).collect();
                ser.serialize_some(&raw)
            }
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<Vec<NaiveTime>>, D::Error> {
        let raw: Option<Vec<String>> = Option::deserialize(de)?;
        raw.map(|list| {
            list.iter()
                .map(|s| NaiveTime::parse_from_str(s, HHMM_FORMAT).map_err(serde::de::Error::custom))
                .collect()
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Slots {
        #[serde(with = "super::hhmm_list")]
        times: Vec<NaiveTime>,
        #[serde(with = "super::hhmm_opt")]
        slot: Option<NaiveTime>,
    }

    #[test]
    fn schedule_slots_round_trip_as_hhmm() {
        let slots = Slots {
            times: vec![
                NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(20, 30, 0).unwrap(),
            ],
            slot: Some(NaiveTime::from_hms_opt(12, 5, 0).unwrap()),
        };

        let json = serde_json::to_string(&slots).unwrap();
        assert!(json.contains("\"08:00\""), "wire form must be HH:MM: {}", json);
        assert!(json.contains("\"20:30\""));
        assert!(json.contains("\"12:05\""));

        let decoded: Slots = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, slots);
    }

    #[test]
    fn malformed_slot_is_rejected() {
        let err = serde_json::from_str::<Slots>(r#"{"times":["8 am"],"slot":null}"#);
        assert!(err.is_err());
    }
}
