//! Request and response payloads shared by the HTTP services and their
//! clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    series::{DaySeries, Hour, SurplusEntry},
    store::StoreError,
};

/// Header carrying the opaque caller identity, resolved by the (external)
/// authentication layer.
pub const IDENTITY_HEADER: &str = "x-identity";

/// An hour as it appears on the wire: either an integer or a numeric string.
///
/// The legacy feeders sent both unpadded (`"5"`) and zero-padded (`"05"`)
/// string hours; everything is normalized to an integer [`Hour`] here, at the
/// boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HourValue {
    Number(u64),
    Label(String),
}

impl HourValue {
    pub fn validate(&self) -> Result<Hour, StoreError> {
        match self {
            Self::Number(raw) => {
                Hour::try_from(*raw).map_err(|_| StoreError::InvalidHour(raw.to_string()))
            }
            Self::Label(label) => label
                .trim()
                .parse::<u64>()
                .ok()
                .and_then(|raw| Hour::try_from(raw).ok())
                .ok_or_else(|| StoreError::InvalidHour(label.clone())),
        }
    }
}

impl From<Hour> for HourValue {
    fn from(hour: Hour) -> Self {
        Self::Number(hour.into())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpsertRequest {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<NaiveDate>,
    pub hour: HourValue,
    pub value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpsertResponse {
    pub status: String,
    pub day: NaiveDate,
    pub hour: Hour,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayRequest {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<NaiveDate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayResponse {
    pub day: NaiveDate,
    pub entries: DaySeries,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurplusRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<NaiveDate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurplusResponse {
    pub day: NaiveDate,
    pub surplus: Vec<SurplusEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeaksRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<NaiveDate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_value_accepts_integers() {
        assert_eq!(HourValue::Number(5).validate().unwrap().get(), 5);
        assert!(matches!(HourValue::Number(24).validate(), Err(StoreError::InvalidHour(_))));
    }

    #[test]
    fn hour_value_accepts_padded_and_unpadded_labels() {
        assert_eq!(HourValue::Label("5".to_owned()).validate().unwrap().get(), 5);
        assert_eq!(HourValue::Label("05".to_owned()).validate().unwrap().get(), 5);
        assert_eq!(HourValue::Label("23".to_owned()).validate().unwrap().get(), 23);
    }

    #[test]
    fn hour_value_rejects_garbage_labels() {
        for label in ["24", "-1", "noon", ""] {
            assert!(
                matches!(
                    HourValue::Label(label.to_owned()).validate(),
                    Err(StoreError::InvalidHour(_)),
                ),
                "{label:?} should be rejected",
            );
        }
    }

    #[test]
    fn upsert_request_deserializes_both_hour_forms() {
        let from_int: UpsertRequest =
            serde_json::from_str(r#"{"field":"production","hour":7,"value":1.0}"#).unwrap();
        let from_label: UpsertRequest =
            serde_json::from_str(r#"{"field":"production","hour":"07","value":1.0}"#).unwrap();
        assert_eq!(from_int.hour.validate().unwrap(), from_label.hour.validate().unwrap());
        assert_eq!(from_int.day, None);
    }
}
