//! Prometheus metrics for the mockwire server.
//!
//! Tracks served requests per mode and outcome, recording activity and
//! upstream latency.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec, Encoder,
    HistogramVec, IntCounter, TextEncoder,
};

lazy_static! {
    /// Total number of non-admin requests served
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "mockwire_requests_total",
        "Total number of requests served",
        &["mode", "outcome"]  // outcome: matched|unmatched|forwarded|upstream_error
    )
    .unwrap();

    /// Exchanges captured in record mode
    pub static ref EXCHANGES_RECORDED_TOTAL: IntCounter = register_int_counter!(
        "mockwire_exchanges_recorded_total",
        "Total number of request/response exchanges recorded"
    )
    .unwrap();

    /// Stubs produced by snapshot requests
    pub static ref SNAPSHOT_MAPPINGS_TOTAL: CounterVec = register_counter_vec!(
        "mockwire_snapshot_mappings_total",
        "Total number of stub mappings exported by snapshots",
        &["kind"]  // kind: plain|scenario
    )
    .unwrap();

    /// Upstream request duration
    pub static ref UPSTREAM_REQUEST_DURATION_MS: HistogramVec = register_histogram_vec!(
        "mockwire_upstream_request_duration_ms",
        "Duration of upstream requests in milliseconds",
        &["method", "status"],
        vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0]
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Helper to record a served request
pub fn record_request(mode: &str, outcome: &str) {
    REQUESTS_TOTAL.with_label_values(&[mode, outcome]).inc();
}

/// Helper to record a captured exchange
pub fn record_exchange() {
    EXCHANGES_RECORDED_TOTAL.inc();
}

/// Helper to record snapshot output
pub fn record_snapshot(plain: usize, scenario: usize) {
    SNAPSHOT_MAPPINGS_TOTAL
        .with_label_values(&["plain"])
        .inc_by(plain as f64);
    SNAPSHOT_MAPPINGS_TOTAL
        .with_label_values(&["scenario"])
        .inc_by(scenario as f64);
}

/// Helper to record upstream request duration
pub fn record_upstream_duration(method: &str, status: u16, duration_ms: f64) {
    UPSTREAM_REQUEST_DURATION_MS
        .with_label_values(&[method, &status.to_string()])
        .observe(duration_ms);
}
