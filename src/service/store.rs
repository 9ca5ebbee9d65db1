//! Store service: saves and returns hourly readings.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};

use crate::{
    prelude::*,
    service::{ApiError, Identity, bad_request, today},
    store::{Field, ReadingStore},
    wire::{DayRequest, DayResponse, UpsertRequest, UpsertResponse},
};

pub fn router(store: Arc<dyn ReadingStore>) -> Router {
    Router::new()
        .route("/store/upsert", post(upsert))
        .route("/store/day", post(day))
        .with_state(store)
}

async fn upsert(
    State(store): State<Arc<dyn ReadingStore>>,
    Identity(identity): Identity,
    payload: Result<Json<UpsertRequest>, JsonRejection>,
) -> Result<Json<UpsertResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_request)?;
    let field = request.field.parse::<Field>()?;
    let hour = request.hour.validate()?;
    let day = request.day.unwrap_or_else(today);
    store.upsert(&identity, field, day, hour, request.value).await?;
    debug!(%identity, %field, %day, %hour, "saved reading");
    Ok(Json(UpsertResponse { status: "saved".to_owned(), day, hour }))
}

async fn day(
    State(store): State<Arc<dyn ReadingStore>>,
    Identity(identity): Identity,
    payload: Result<Json<DayRequest>, JsonRejection>,
) -> Result<Json<DayResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_request)?;
    let field = request.field.parse::<Field>()?;
    let day = request.day.unwrap_or_else(today);
    let entries = store.get_day(&identity, field, day).await?;
    Ok(Json(DayResponse { day, entries }))
}
