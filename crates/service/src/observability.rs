use std::time::Duration;

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder};

use crate::operation::Operation;
use crate::outcome::Outcome;

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "crudapi_requests_total",
        "Total CRUD requests by operation and outcome",
        &["op", "outcome"]
    )
    .expect("register requests_total")
});

pub static REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "crudapi_request_duration_seconds",
        "Dispatch duration in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("register request_duration")
});

pub fn record(op: Operation, outcome: Outcome, elapsed: Duration) {
    REQUESTS_TOTAL
        .with_label_values(&[op.as_str(), outcome.as_str()])
        .inc();
    REQUEST_DURATION.observe(elapsed.as_secs_f64());
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
