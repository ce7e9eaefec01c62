//! Metrics collection and exposition.
//!
//! # Metrics
//! - `weather_requests_total` (counter): requests by service, route, status
//! - `weather_request_duration_seconds` (histogram): latency by service, route
//! - `weather_upstream_calls_total` (counter): outbound calls by dependency, outcome
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(service: &'static str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "weather_requests_total",
        "service" => service,
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "weather_request_duration_seconds",
        "service" => service,
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream(dependency: &'static str, outcome: &'static str) {
    metrics::counter!(
        "weather_upstream_calls_total",
        "dependency" => dependency,
        "outcome" => outcome
    )
    .increment(1);
}

/// Middleware recording one request sample per response.
pub async fn track_requests(
    State(service): State<&'static str>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(service, &route, response.status().as_u16(), start);
    response
}
