//! Route handlers.

use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use url::form_urlencoded;

use crate::gateway::{relay, validate};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// `GET /api/feature-info?url=<candidate>`
///
/// Validates the candidate against the allowlist policy, fetches it once and
/// relays the upstream body as JSON. The query string is read raw so a
/// repeated `url` key resolves to its first value instead of a plain-text
/// extractor rejection.
pub async fn feature_info(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let start = Instant::now();
    let candidate = query.as_deref().and_then(first_url_param);
    let result = proxy_feature_info(&state, candidate.as_deref()).await;

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    metrics::record_feature_info(outcome, start);

    result.map(Json)
}

/// First `url` value in a raw query string.
fn first_url_param(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

async fn proxy_feature_info(state: &AppState, candidate: Option<&str>) -> Result<Value, ApiError> {
    let candidate = candidate.map(str::trim).unwrap_or_default();
    if candidate.is_empty() {
        return Err(ApiError::MissingUrl);
    }

    let validated = validate(candidate, &state.policy).inspect_err(|rejection| {
        tracing::info!(reason = rejection.tag(), "FeatureInfo URL rejected");
    })?;

    let fetch_start = Instant::now();
    let fetched = state.fetcher.fetch(&validated).await;
    metrics::record_upstream_fetch(fetched.is_ok(), fetch_start);

    let fetched = fetched.inspect_err(|e| {
        tracing::warn!(
            kind = e.tag(),
            error = %e,
            elapsed_ms = fetch_start.elapsed().as_millis() as u64,
            "GetFeatureInfo upstream fetch failed"
        );
    })?;

    tracing::debug!(
        content_type = %fetched.content_type,
        bytes = fetched.body.len(),
        elapsed_ms = fetch_start.elapsed().as_millis() as u64,
        "GetFeatureInfo fetched"
    );

    Ok(relay(fetched))
}

/// Map client settings handed to the browser.
#[derive(Debug, Serialize)]
pub struct MapConfigResponse {
    pub wms_base_url: String,
    pub wms_layer: String,
    pub wms_server_type: String,
}

/// `GET /api/map-config`
pub async fn map_config(State(state): State<AppState>) -> Json<MapConfigResponse> {
    Json(MapConfigResponse {
        wms_base_url: state.wms.base_url.clone(),
        wms_layer: state.wms.layer.clone(),
        wms_server_type: state.wms.server_type.clone(),
    })
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
