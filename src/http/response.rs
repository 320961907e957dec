//! Error responses.
//!
//! # Design Decisions
//! - Every error body is `{"error": "<message>"}`
//! - Validation rejections are 400 with the specific reason
//! - Upstream failures are 502 with the upstream detail
//! - Anything unclassified is a generic 500

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::gateway::{FetchError, Rejection};

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing 'url' parameter.")]
    MissingUrl,

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Failed to fetch GetFeatureInfo: {0}")]
    Fetch(#[from] FetchError),

    #[error("Page not found.")]
    NotFound,

    #[error("Unexpected server error.")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Outcome label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ApiError::MissingUrl => "missing_url",
            ApiError::Rejected(r) => r.tag(),
            ApiError::Fetch(e) => e.tag(),
            ApiError::NotFound => "not_found",
            ApiError::Internal => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Map a handler panic to a generic 500.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    ApiError::Internal.into_response()
}
