//! Per-identity hourly reading store: the `production` and `consumption`
//! series of every user, keyed by day.

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use self::{client::StoreClient, memory::MemoryStore};
use crate::series::{DaySeries, Hour};

mod client;
mod memory;

/// Timeout for any single upstream call in the pipeline.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// The two independently addressable series of a user.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    #[display("production")]
    Production,
    #[display("consumption")]
    Consumption,
}

impl FromStr for Field {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "production" => Ok(Self::Production),
            "consumption" => Ok(Self::Consumption),
            _ => Err(StoreError::InvalidField(raw.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown field {0:?}, expected \"production\" or \"consumption\"")]
    InvalidField(String),

    #[error("invalid hour {0:?}, expected an integer in 0..=23")]
    InvalidHour(String),

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream is unavailable: {0}")]
    Unavailable(String),

    #[error("upstream responded with status {0}")]
    Status(http::StatusCode),
}

impl StoreError {
    /// Classify a transport-level failure: timeouts are distinguished from
    /// every other connection problem.
    pub(crate) fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() { Self::Timeout } else { Self::Unavailable(error.to_string()) }
    }
}

/// Reading storage, either in-process ([`MemoryStore`]) or remote
/// ([`StoreClient`]).
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Write one hour's value into the `(identity, field, day)` series,
    /// replacing any existing entry for that hour.
    ///
    /// Upserts targeting the same series are applied one at a time; a failed
    /// upsert leaves the store untouched.
    async fn upsert(
        &self,
        identity: &str,
        field: Field,
        day: NaiveDate,
        hour: Hour,
        value: f64,
    ) -> Result<(), StoreError>;

    /// Read the series for `(identity, field, day)`.
    ///
    /// An unknown identity or day is an empty series, never an error.
    async fn get_day(
        &self,
        identity: &str,
        field: Field,
        day: NaiveDate,
    ) -> Result<DaySeries, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_parses_known_values() {
        assert_eq!("production".parse::<Field>().unwrap(), Field::Production);
        assert_eq!("consumption".parse::<Field>().unwrap(), Field::Consumption);
    }

    #[test]
    fn field_rejects_unknown_value() {
        assert!(matches!(
            "temperature".parse::<Field>(),
            Err(StoreError::InvalidField(raw)) if raw == "temperature",
        ));
    }
}
