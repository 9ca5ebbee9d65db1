//! Hourly time-series model: one value per hour slot within a day.

use serde::{Deserialize, Serialize};

/// One hour slot within a day, `0..=23`.
///
/// Hours are compared and sorted numerically: hour `2` comes before hour `10`.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "u64", into = "u64")]
pub struct Hour(u8);

impl Hour {
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u64> for Hour {
    type Error = HourOutOfRange;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        match u8::try_from(raw) {
            Ok(hour) if hour <= 23 => Ok(Self(hour)),
            _ => Err(HourOutOfRange(raw)),
        }
    }
}

impl From<Hour> for u64 {
    fn from(hour: Hour) -> Self {
        Self::from(hour.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("hour {0} is outside 0..=23")]
pub struct HourOutOfRange(pub u64);

/// A single hourly reading.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HourEntry {
    pub hour: Hour,
    pub value: f64,
}

/// Readings of one day, unique by hour and sorted by numeric hour.
///
/// The ordering is maintained structurally: [`Self::upsert`] inserts in place,
/// and deserialization re-sorts whatever order the payload arrived in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, derive_more::IntoIterator)]
#[serde(from = "Vec<HourEntry>", into = "Vec<HourEntry>")]
pub struct DaySeries(#[into_iterator(owned, ref)] Vec<HourEntry>);

impl DaySeries {
    /// Set the value for an hour, replacing an existing entry for the same
    /// hour rather than appending a duplicate.
    pub fn upsert(&mut self, hour: Hour, value: f64) {
        match self.0.binary_search_by_key(&hour, |entry| entry.hour) {
            Ok(index) => self.0[index].value = value,
            Err(index) => self.0.insert(index, HourEntry { hour, value }),
        }
    }

    pub fn value_at(&self, hour: Hour) -> Option<f64> {
        self.0
            .binary_search_by_key(&hour, |entry| entry.hour)
            .ok()
            .map(|index| self.0[index].value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HourEntry> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<HourEntry>> for DaySeries {
    fn from(entries: Vec<HourEntry>) -> Self {
        let mut series = Self::default();
        for entry in entries {
            series.upsert(entry.hour, entry.value);
        }
        series
    }
}

impl From<DaySeries> for Vec<HourEntry> {
    fn from(series: DaySeries) -> Self {
        series.0
    }
}

/// One merged hour of the surplus series. Derived, never persisted.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurplusEntry {
    pub hour: Hour,
    pub production: f64,
    pub consumption: f64,
    pub surplus: f64,
}

/// Outcome of peak detection over one day's surplus series.
///
/// `threshold` is `None` when the surplus series was empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakReport {
    pub day: chrono::NaiveDate,
    pub consumption_mean: f64,
    pub threshold: Option<f64>,
    pub peak_hours: Vec<Hour>,
}
