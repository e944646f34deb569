//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Expose a Prometheus-compatible scrape endpoint on its own listener
//! - Track per-tenant request counts, latencies and upstream failures
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by tenant, method, status
//! - `gateway_request_duration_seconds` (histogram): latency by tenant
//! - `gateway_upstream_errors_total` (counter): forwarding failures by tenant, kind
//!
//! # Design Decisions
//! - Label values stay low-cardinality: slugs, methods, status codes
//! - Recording is fire-and-forget; a missing exporter costs nothing

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter. Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

/// Record one handled request.
pub fn record_request(tenant: &str, method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "tenant" => tenant.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);

    histogram!("gateway_request_duration_seconds", "tenant" => tenant.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a forwarding failure by error kind.
pub fn record_upstream_error(tenant: &str, kind: &'static str) {
    counter!(
        "gateway_upstream_errors_total",
        "tenant" => tenant.to_string(),
        "kind" => kind,
    )
    .increment(1);
}
