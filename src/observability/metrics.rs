//! Metrics collection and exposition.
//!
//! # Metrics
//! - `forum_client_requests_total` (counter): live calls by method, status
//! - `forum_client_request_duration_seconds` (histogram): live call latency
//! - `forum_client_outages_total` (counter): outages by classification
//! - `forum_client_fallback_total` (counter): router outcomes by rule, result
//! - `forum_client_degraded_mode` (gauge): 1 once the client went offline
//!
//! # Design Decisions
//! - Facade only; without an installed recorder every call is a no-op
//! - Status 0 stands for "no response"

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one live call.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "forum_client_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("forum_client_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a classified outage.
pub fn record_outage(classification: &'static str) {
    counter!("forum_client_outages_total", "classification" => classification).increment(1);
}

/// Record a fallback router outcome.
pub fn record_fallback(rule: &str, result: &'static str) {
    counter!(
        "forum_client_fallback_total",
        "rule" => rule.to_string(),
        "result" => result
    )
    .increment(1);
}

/// Record whether the client is in degraded mode.
pub fn record_degraded_mode(degraded: bool) {
    gauge!("forum_client_degraded_mode").set(if degraded { 1.0 } else { 0.0 });
}
