//! Prometheus metrics recording and background collection.

use metrics::{counter, gauge, histogram};
use pulseboard_core::RecordStore;
use std::time::Duration;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records one store query and the time spent computing it.
pub fn record_query(kind: &'static str, duration: Duration) {
    counter!("pulseboard_queries_total", "kind" => kind).increment(1);
    histogram!("pulseboard_query_duration_seconds", "kind" => kind)
        .record(duration.as_secs_f64());
}

/// Updates the store-level gauges.
pub fn update_store_metrics(store: &RecordStore) {
    gauge!("pulseboard_records_total").set(store.len() as f64);
}
