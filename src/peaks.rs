//! Consumption-peak detection over a day's surplus series.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    prelude::*,
    series::{Hour, PeakReport},
    store::StoreError,
    surplus::SurplusSource,
};

/// Flags the hours whose surplus falls below the negated mean consumption of
/// the series being analysed.
///
/// The threshold is self-referential: a flagged hour's own consumption is part
/// of the mean that flags it.
pub struct PeakDetector {
    source: Arc<dyn SurplusSource>,
}

impl PeakDetector {
    pub fn new(source: Arc<dyn SurplusSource>) -> Self {
        Self { source }
    }

    #[instrument(skip(self))]
    pub async fn detect(&self, identity: &str, day: NaiveDate) -> Result<PeakReport, StoreError> {
        let surplus = self.source.surplus(identity, day).await?;
        if surplus.is_empty() {
            return Ok(PeakReport {
                day,
                consumption_mean: 0.0,
                threshold: None,
                peak_hours: Vec::new(),
            });
        }

        // Consumption is reconstructed as production − surplus, not read off
        // the entry.
        let consumption_mean = surplus
            .iter()
            .map(|entry| entry.production - entry.surplus)
            .sum::<f64>()
            / surplus.len() as f64;
        let threshold = -consumption_mean;

        // Strictly below: an hour exactly at the threshold is not a peak.
        let peak_hours: Vec<Hour> = surplus
            .iter()
            .filter(|entry| entry.surplus < threshold)
            .map(|entry| entry.hour)
            .collect();
        debug!(consumption_mean, threshold, n_peaks = peak_hours.len(), "detected peaks");

        Ok(PeakReport { day, consumption_mean, threshold: Some(threshold), peak_hours })
    }
}
