//! Metrics collection.
//!
//! # Metrics
//! - `sql_retries_total` (counter): retries by policy
//! - `sql_timeouts_total` (counter): operations aborted by the timeout policy
//! - `sql_operations_total` (counter): completed operations by name, outcome
//! - `sql_operation_duration_seconds` (histogram): wall time including retries

use std::time::Instant;

use metrics::{counter, histogram};

pub fn record_retry(policy: &'static str) {
    counter!("sql_retries_total", "policy" => policy).increment(1);
}

pub fn record_timeout() {
    counter!("sql_timeouts_total").increment(1);
}

pub fn record_operation(operation: &str, outcome: &'static str, start: Instant) {
    let operation = operation.to_string();
    counter!("sql_operations_total", "operation" => operation.clone(), "outcome" => outcome)
        .increment(1);
    histogram!("sql_operation_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
