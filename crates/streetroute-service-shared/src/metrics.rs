//! Prometheus recorder and the route counters and histograms it exports.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use thiserror::Error;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

static RECORDER: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Error)]
#[error("failed to install prometheus recorder: {0}")]
pub struct MetricsError(String);

/// Install the process-wide Prometheus recorder.
///
/// Repeated calls return the handle installed by the first one.
pub fn init_metrics() -> Result<&'static PrometheusHandle, MetricsError> {
    RECORDER.get_or_try_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| MetricsError(e.to_string()))
    })
}

/// Render the exposition text, or 503 when metrics were never enabled.
pub async fn metrics_handler() -> Response {
    match RECORDER.get() {
        Some(handle) => (
            [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics disabled\n").into_response(),
    }
}

/// Increment `streetroute_routes_calculated_total`.
pub fn record_route_calculated(service: &str) {
    metrics::counter!(
        "streetroute_routes_calculated_total",
        "service" => service.to_string()
    )
    .increment(1);
}

/// Increment `streetroute_routes_failed_total`.
///
/// `reason` is one of `no_path`, `validation_error` or `internal`.
pub fn record_route_failed(reason: &str, service: &str) {
    metrics::counter!(
        "streetroute_routes_failed_total",
        "reason" => reason.to_string(),
        "service" => service.to_string()
    )
    .increment(1);
}

/// Record the node count of a successful route.
pub fn record_route_nodes(nodes: usize) {
    metrics::histogram!("streetroute_route_nodes").record(nodes as f64);
}

/// Record the length in metres of a successful route.
pub fn record_route_length(length_m: f64) {
    metrics::histogram!("streetroute_route_length_meters").record(length_m);
}
