//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mock_requests_total` (counter): handled requests by classification, status
//! - `mock_passthrough_total` (counter): requests no route claimed
//! - `mock_auth_denied_total` (counter): 401s by stage (`api`, `route`)
//! - `mock_reloads_total` (counter): API reloads by result
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus exporter is opt-in via configuration

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::crud::Classification;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(classification: Classification, status: u16) {
    metrics::counter!(
        "mock_requests_total",
        "classification" => classification.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_passthrough() {
    metrics::counter!("mock_passthrough_total").increment(1);
}

pub fn record_auth_denied(stage: &'static str) {
    metrics::counter!("mock_auth_denied_total", "stage" => stage).increment(1);
}

pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("mock_reloads_total", "result" => result).increment(1);
}
