//! Surplus service: merges a day's production and consumption into an hourly
//! surplus series.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};

use crate::{
    service::{ApiError, Identity, bad_request, today},
    surplus::SurplusSource,
    wire::{SurplusRequest, SurplusResponse},
};

pub fn router(pipeline: Arc<dyn SurplusSource>) -> Router {
    Router::new().route("/surplus", post(surplus)).with_state(pipeline)
}

async fn surplus(
    State(pipeline): State<Arc<dyn SurplusSource>>,
    Identity(identity): Identity,
    payload: Result<Json<SurplusRequest>, JsonRejection>,
) -> Result<Json<SurplusResponse>, ApiError> {
    let Json(request) = payload.map_err(bad_request)?;
    let day = request.day.unwrap_or_else(today);
    let surplus = pipeline.surplus(&identity, day).await?;
    Ok(Json(SurplusResponse { day, surplus }))
}
