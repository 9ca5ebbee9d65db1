//! Remote reading store: the store service's HTTP API behind the
//! [`ReadingStore`] trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    prelude::*,
    series::{DaySeries, Hour},
    store::{Field, ReadingStore, StoreError, UPSTREAM_TIMEOUT},
    wire::{DayRequest, DayResponse, IDENTITY_HEADER, UpsertRequest, UpsertResponse},
};

pub struct StoreClient {
    client: Client,
    upsert_url: Url,
    day_url: Url,
}

impl StoreClient {
    pub fn try_new(base_url: Url) -> Result<Self> {
        Self::with_timeout(base_url, UPSTREAM_TIMEOUT)
    }

    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            upsert_url: base_url.join("store/upsert")?,
            day_url: base_url.join("store/day")?,
        })
    }

    async fn post<Request: Serialize, Response: DeserializeOwned>(
        &self,
        url: &Url,
        identity: &str,
        request: &Request,
    ) -> Result<Response, StoreError> {
        let response = self
            .client
            .post(url.clone())
            .header(IDENTITY_HEADER, identity)
            .json(request)
            .send()
            .await
            .map_err(|error| StoreError::from_transport(&error))?;
        if !response.status().is_success() {
            return Err(StoreError::Status(response.status()));
        }
        response.json().await.map_err(|error| StoreError::Unavailable(error.to_string()))
    }
}

#[async_trait]
impl ReadingStore for StoreClient {
    #[instrument(skip(self, value))]
    async fn upsert(
        &self,
        identity: &str,
        field: Field,
        day: NaiveDate,
        hour: Hour,
        value: f64,
    ) -> Result<(), StoreError> {
        let request = UpsertRequest {
            field: field.to_string(),
            day: Some(day),
            hour: hour.into(),
            value,
        };
        let _response: UpsertResponse = self.post(&self.upsert_url, identity, &request).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_day(
        &self,
        identity: &str,
        field: Field,
        day: NaiveDate,
    ) -> Result<DaySeries, StoreError> {
        let request = DayRequest { field: field.to_string(), day: Some(day) };
        let response: DayResponse = self.post(&self.day_url, identity, &request).await?;
        Ok(response.entries)
    }
}
