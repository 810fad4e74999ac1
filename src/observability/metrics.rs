//! Metrics collection and exposition.
//!
//! # Metrics
//! - `odata_route_matches_total` (counter): resolved requests by route
//! - `odata_route_misses_total` (counter): requests no route resolved
//! - `odata_route_resolution_duration_seconds` (histogram): time spent routing
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional (config `observability.metrics_enabled`)

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a request resolved by `route`.
pub fn record_match(route: &str, start: Instant) {
    metrics::counter!("odata_route_matches_total", "route" => route.to_string()).increment(1);
    metrics::histogram!("odata_route_resolution_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Record a request that no route resolved.
pub fn record_miss(start: Instant) {
    metrics::counter!("odata_route_misses_total").increment(1);
    metrics::histogram!("odata_route_resolution_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}
