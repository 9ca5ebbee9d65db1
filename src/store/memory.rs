//! In-memory store backing the store service and the unit tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    series::{DaySeries, Hour},
    store::{Field, ReadingStore, StoreError},
};

type DayMap = HashMap<NaiveDate, DaySeries>;

/// One record per `(identity, field)`, each guarded by its own mutex so that
/// read-modify-write upserts on the same series cannot lose updates while
/// disjoint records stay independent.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<RecordKey, Arc<Mutex<DayMap>>>>>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
struct RecordKey {
    identity: String,
    field: Field,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for `(identity, field)`, provisioning an empty one
    /// on first touch.
    fn record(&self, identity: &str, field: Field) -> Arc<Mutex<DayMap>> {
        let key = RecordKey { identity: identity.to_owned(), field };
        if let Some(record) = self.records.read().expect("record map lock poisoned").get(&key) {
            return Arc::clone(record);
        }
        let mut records = self.records.write().expect("record map lock poisoned");
        Arc::clone(records.entry(key).or_default())
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn upsert(
        &self,
        identity: &str,
        field: Field,
        day: NaiveDate,
        hour: Hour,
        value: f64,
    ) -> Result<(), StoreError> {
        let record = self.record(identity, field);
        let mut days = record.lock().expect("record lock poisoned");
        days.entry(day).or_default().upsert(hour, value);
        Ok(())
    }

    async fn get_day(
        &self,
        identity: &str,
        field: Field,
        day: NaiveDate,
    ) -> Result<DaySeries, StoreError> {
        let record = self.record(identity, field);
        let days = record.lock().expect("record lock poisoned");
        Ok(days.get(&day).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Result;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 21).unwrap()
    }

    fn hour(raw: u64) -> Hour {
        Hour::try_from(raw).unwrap()
    }

    #[tokio::test]
    async fn unknown_identity_reads_empty() -> Result {
        let store = MemoryStore::new();
        let series = store.get_day("nobody@example.com", Field::Production, day()).await?;
        assert!(series.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn upsert_replaces_existing_hour() -> Result {
        let store = MemoryStore::new();
        store.upsert("alice@example.com", Field::Production, day(), hour(5), 1.0).await?;
        store.upsert("alice@example.com", Field::Production, day(), hour(5), 2.0).await?;
        let series = store.get_day("alice@example.com", Field::Production, day()).await?;
        assert_eq!(series.len(), 1);
        assert_eq!(series.value_at(hour(5)), Some(2.0));
        Ok(())
    }

    #[tokio::test]
    async fn fields_are_independent() -> Result {
        let store = MemoryStore::new();
        store.upsert("alice@example.com", Field::Production, day(), hour(0), 5.0).await?;
        store.upsert("alice@example.com", Field::Consumption, day(), hour(0), 3.0).await?;
        let production = store.get_day("alice@example.com", Field::Production, day()).await?;
        let consumption = store.get_day("alice@example.com", Field::Consumption, day()).await?;
        assert_eq!(production.value_at(hour(0)), Some(5.0));
        assert_eq!(consumption.value_at(hour(0)), Some(3.0));
        Ok(())
    }

    #[tokio::test]
    async fn reads_come_back_in_numeric_hour_order() -> Result {
        let store = MemoryStore::new();
        for raw in [10, 2, 0, 23] {
            store.upsert("alice@example.com", Field::Consumption, day(), hour(raw), 1.0).await?;
        }
        let series = store.get_day("alice@example.com", Field::Consumption, day()).await?;
        let hours: Vec<u8> = series.iter().map(|entry| entry.hour.get()).collect();
        assert_eq!(hours, [0, 2, 10, 23]);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_upserts_to_one_series_lose_nothing() -> Result {
        let store = MemoryStore::new();
        let tasks: Vec<_> = (0..24_u64)
            .map(|raw| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert("alice@example.com", Field::Production, day(), hour(raw), raw as f64)
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await??;
        }

        let series = store.get_day("alice@example.com", Field::Production, day()).await?;
        assert_eq!(series.len(), 24);
        for raw in 0..24_u64 {
            assert_eq!(series.value_at(hour(raw)), Some(raw as f64));
        }
        Ok(())
    }
}
