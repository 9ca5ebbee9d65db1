//! HTTP edge shared by the three services: identity extraction, error
//! mapping, and the serving loop.

use axum::{
    Json, Router,
    extract::{FromRequestParts, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};

use crate::{
    prelude::*,
    store::StoreError,
    wire::{ErrorResponse, IDENTITY_HEADER},
};

pub mod peaks;
pub mod store;
pub mod surplus;

pub async fn serve(router: Router, bind: &str) -> Result {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(address = %listener.local_addr()?, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Opaque caller identity, taken from the `x-identity` header.
///
/// The core never parses session material; resolving a session token into
/// this string is the authentication layer's job.
pub struct Identity(pub String);

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|identity| !identity.is_empty())
            .map(|identity| Self(identity.to_owned()))
            .ok_or(ApiError::MissingIdentity)
    }
}

/// Failure of a service call, mapped onto a status code that tells a data
/// problem (4xx) apart from a dependency outage (5xx).
#[derive(Debug)]
pub enum ApiError {
    MissingIdentity,
    BadRequest(String),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::MissingIdentity => {
                (StatusCode::UNAUTHORIZED, "identity required".to_owned())
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Store(error) => {
                let status = match &error {
                    StoreError::InvalidField(_) | StoreError::InvalidHour(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    StoreError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    StoreError::Unavailable(_) | StoreError::Status(_) => StatusCode::BAD_GATEWAY,
                };
                (status, error.to_string())
            }
        };
        warn!(%status, %error, "request failed");
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// A body the JSON extractor choked on is a request error, reported in the
/// same `{error}` shape as everything else.
pub(crate) fn bad_request(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}
