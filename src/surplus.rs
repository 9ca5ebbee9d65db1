//! Surplus pipeline: merges a day's production and consumption series into
//! one hourly `production − consumption` sequence.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use itertools::Itertools;
use reqwest::{Client, Url};

use crate::{
    prelude::*,
    series::{Hour, SurplusEntry},
    store::{Field, ReadingStore, StoreError, UPSTREAM_TIMEOUT},
    wire::{IDENTITY_HEADER, SurplusRequest, SurplusResponse},
};

/// Anything that can produce a day's surplus series: the in-process
/// [`SurplusPipeline`] or the remote [`SurplusClient`].
#[async_trait]
pub trait SurplusSource: Send + Sync {
    async fn surplus(
        &self,
        identity: &str,
        day: NaiveDate,
    ) -> Result<Vec<SurplusEntry>, StoreError>;
}

/// Computes surplus from an injected reading store.
///
/// The result is never cached or persisted: every call recomputes from the
/// two raw series, so an edit to either one shows up on the next call.
pub struct SurplusPipeline {
    store: Arc<dyn ReadingStore>,
}

impl SurplusPipeline {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Merge the two series over the union of their hours, defaulting a
    /// missing side to zero, in ascending numeric hour order.
    ///
    /// Either fetch failing fails the whole call: no partial surplus, no
    /// retry.
    #[instrument(skip(self))]
    pub async fn compute(
        &self,
        identity: &str,
        day: NaiveDate,
    ) -> Result<Vec<SurplusEntry>, StoreError> {
        let (production, consumption) = tokio::try_join!(
            self.store.get_day(identity, Field::Production, day),
            self.store.get_day(identity, Field::Consumption, day),
        )?;

        let production: HashMap<Hour, f64> =
            production.into_iter().map(|entry| (entry.hour, entry.value)).collect();
        let consumption: HashMap<Hour, f64> =
            consumption.into_iter().map(|entry| (entry.hour, entry.value)).collect();

        let entries: Vec<SurplusEntry> = production
            .keys()
            .chain(consumption.keys())
            .copied()
            .unique()
            .sorted()
            .map(|hour| {
                let production = production.get(&hour).copied().unwrap_or_default();
                let consumption = consumption.get(&hour).copied().unwrap_or_default();
                SurplusEntry { hour, production, consumption, surplus: production - consumption }
            })
            .collect();
        debug!(n_hours = entries.len(), "computed surplus");
        Ok(entries)
    }
}

#[async_trait]
impl SurplusSource for SurplusPipeline {
    async fn surplus(
        &self,
        identity: &str,
        day: NaiveDate,
    ) -> Result<Vec<SurplusEntry>, StoreError> {
        self.compute(identity, day).await
    }
}

/// Remote surplus pipeline: the surplus service's HTTP API behind the
/// [`SurplusSource`] trait.
pub struct SurplusClient {
    client: Client,
    url: Url,
}

impl SurplusClient {
    pub fn try_new(base_url: Url) -> Result<Self> {
        Self::with_timeout(base_url, UPSTREAM_TIMEOUT)
    }

    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: base_url.join("surplus")?,
        })
    }
}

#[async_trait]
impl SurplusSource for SurplusClient {
    #[instrument(skip(self))]
    async fn surplus(
        &self,
        identity: &str,
        day: NaiveDate,
    ) -> Result<Vec<SurplusEntry>, StoreError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(IDENTITY_HEADER, identity)
            .json(&SurplusRequest { day: Some(day) })
            .send()
            .await
            .map_err(|error| StoreError::from_transport(&error))?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }
        let response: SurplusResponse = response
            .json()
            .await
            .map_err(|error| StoreError::Unavailable(error.to_string()))?;
        Ok(response.surplus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{series::DaySeries, store::MemoryStore};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 21).unwrap()
    }

    fn hour(raw: u64) -> Hour {
        Hour::try_from(raw).unwrap()
    }

    #[tokio::test]
    async fn merges_over_the_union_of_hours() -> Result {
        let store = MemoryStore::new();
        store.upsert("alice@example.com", Field::Production, day(), hour(0), 5.0).await?;
        store.upsert("alice@example.com", Field::Production, day(), hour(1), 3.0).await?;
        store.upsert("alice@example.com", Field::Consumption, day(), hour(1), 1.0).await?;
        store.upsert("alice@example.com", Field::Consumption, day(), hour(2), 4.0).await?;

        let pipeline = SurplusPipeline::new(Arc::new(store));
        let surplus = pipeline.compute("alice@example.com", day()).await?;

        assert_eq!(
            surplus,
            [
                SurplusEntry { hour: hour(0), production: 5.0, consumption: 0.0, surplus: 5.0 },
                SurplusEntry { hour: hour(1), production: 3.0, consumption: 1.0, surplus: 2.0 },
                SurplusEntry { hour: hour(2), production: 0.0, consumption: 4.0, surplus: -4.0 },
            ],
        );
        Ok(())
    }

    #[tokio::test]
    async fn orders_hours_numerically() -> Result {
        let store = MemoryStore::new();
        for raw in [10, 2, 0, 23] {
            store.upsert("alice@example.com", Field::Production, day(), hour(raw), 1.0).await?;
        }

        let pipeline = SurplusPipeline::new(Arc::new(store));
        let surplus = pipeline.compute("alice@example.com", day()).await?;
        let hours: Vec<u8> = surplus.iter().map(|entry| entry.hour.get()).collect();
        assert_eq!(hours, [0, 2, 10, 23]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_day_yields_empty_surplus() -> Result {
        let pipeline = SurplusPipeline::new(Arc::new(MemoryStore::new()));
        let surplus = pipeline.compute("alice@example.com", day()).await?;
        assert!(surplus.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn upstream_failure_fails_the_whole_call() {
        struct DownStore;

        #[async_trait]
        impl ReadingStore for DownStore {
            async fn upsert(
                &self,
                _identity: &str,
                _field: Field,
                _day: NaiveDate,
                _hour: Hour,
                _value: f64,
            ) -> Result<(), StoreError> {
                Err(StoreError::Unavailable("store is down".to_owned()))
            }

            async fn get_day(
                &self,
                _identity: &str,
                _field: Field,
                _day: NaiveDate,
            ) -> Result<DaySeries, StoreError> {
                Err(StoreError::Unavailable("store is down".to_owned()))
            }
        }

        let pipeline = SurplusPipeline::new(Arc::new(DownStore));
        let error = pipeline.compute("alice@example.com", day()).await.unwrap_err();
        assert!(matches!(error, StoreError::Unavailable(_)));
    }
}
