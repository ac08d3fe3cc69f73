//! Service middleware for request logging and query metrics.
//!
//! Metrics are emitted as structured `tracing` events under the
//! `flight_network::metrics` target so they can be aggregated from logs.

use axum::{extract::Request, middleware::Next, response::Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{info, info_span, Instrument};

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Request id from `X-Request-Id`, or a process-local sequence number.
fn request_id(request: &Request) -> String {
    request
        .headers()
        .get("X-Request-Id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("req-{}", REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)))
}

/// Wrap each request in a span and log its status and latency.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let response = next.run(request).instrument(span.clone()).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    span.record("status", status);
    span.record("latency_ms", latency_ms);

    info!(
        target: "flight_network::access",
        request_id = %request_id,
        method = %method,
        path = %path,
        status = status,
        latency_ms = latency_ms,
        "request completed"
    );

    response
}

/// Record a graph query.
///
/// `results` is the number of paths, hubs or routes returned.
pub fn record_query_metrics(query: &str, results: usize, latency_ms: u64) {
    info!(
        target: "flight_network::metrics",
        metric_type = "query",
        query = query,
        results = results,
        latency_ms = latency_ms,
        "query_metric"
    );
}
