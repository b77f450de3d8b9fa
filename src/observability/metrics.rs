//! Metrics collection.
//!
//! # Metrics
//! - `stackit_client_requests_total` (counter): dispatches by method, status
//! - `stackit_client_request_duration_seconds` (histogram): per-dispatch latency
//! - `stackit_client_retries_total` (counter): retries by method, reason
//! - `stackit_client_refresh_total` (counter): refresh attempts by outcome
//!
//! Recorded through the `metrics` facade; the embedding application decides
//! whether to install a recorder.

use std::time::Instant;

use metrics::{counter, histogram};

/// Record one dispatch. `status` is the HTTP code or a failure label.
pub fn record_request(method: &str, status: &str, start: Instant) {
    counter!(
        "stackit_client_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "stackit_client_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(method: &str, reason: &str) {
    counter!(
        "stackit_client_retries_total",
        "method" => method.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// `outcome` is one of `refreshed`, `shared`, `failed`.
pub fn record_refresh(outcome: &'static str) {
    counter!("stackit_client_refresh_total", "outcome" => outcome).increment(1);
}
