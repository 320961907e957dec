//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_feature_info_requests_total` (counter): requests by outcome
//! - `gateway_feature_info_duration_seconds` (histogram): end-to-end latency
//! - `gateway_upstream_fetch_duration_seconds` (histogram): upstream time

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record the final outcome of one feature-info request.
pub fn record_feature_info(outcome: &'static str, start: Instant) {
    metrics::counter!("gateway_feature_info_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("gateway_feature_info_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record time spent waiting on the upstream.
pub fn record_upstream_fetch(success: bool, start: Instant) {
    let result = if success { "ok" } else { "error" };
    metrics::histogram!("gateway_upstream_fetch_duration_seconds", "result" => result)
        .record(start.elapsed().as_secs_f64());
}
