//! Peaks service: reports the consumption-peak hours of a day.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};

use crate::{
    peaks::PeakDetector,
    series::PeakReport,
    service::{ApiError, Identity, bad_request, today},
    wire::PeaksRequest,
};

pub fn router(detector: Arc<PeakDetector>) -> Router {
    Router::new().route("/peaks", post(peaks)).with_state(detector)
}

async fn peaks(
    State(detector): State<Arc<PeakDetector>>,
    Identity(identity): Identity,
    payload: Result<Json<PeaksRequest>, JsonRejection>,
) -> Result<Json<PeakReport>, ApiError> {
    let Json(request) = payload.map_err(bad_request)?;
    let day = request.day.unwrap_or_else(today);
    let report = detector.detect(&identity, day).await?;
    Ok(Json(report))
}
