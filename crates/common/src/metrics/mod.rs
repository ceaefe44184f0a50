//! Metrics and observability utilities
//!
//! Prometheus-style metrics for the parsing pipeline, its capability
//! fallbacks, the booking desk, and gateway requests.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Wayfarer metrics
pub const METRICS_PREFIX: &str = "wayfarer";

/// Histogram buckets for request latency (in seconds)
/// Targets: P50 < 5ms for local parsing, P99 < 250ms with remote NER
pub const LATENCY_BUCKETS: &[f64] = &[
    0.0005, // 0.5ms
    0.001,  // 1ms
    0.005,  // 5ms - P50 target
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms - P99 target
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Parser metrics
    describe_counter!(
        format!("{}_parses_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of parsed queries"
    );

    describe_histogram!(
        format!("{}_parse_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Query parsing latency in seconds"
    );

    describe_counter!(
        format!("{}_destination_resolutions_total", METRICS_PREFIX),
        Unit::Count,
        "Destination resolutions by pipeline stage"
    );

    describe_counter!(
        format!("{}_capability_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Inference capability failures absorbed by a fallback"
    );

    // Booking metrics
    describe_counter!(
        format!("{}_bookings_total", METRICS_PREFIX),
        Unit::Count,
        "Total bookings issued"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record a completed parse
pub fn record_parse(duration_secs: f64, strategy: &str, destination_stage: &str) {
    counter!(
        format!("{}_parses_total", METRICS_PREFIX),
        "strategy" => strategy.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_parse_duration_seconds", METRICS_PREFIX),
        "strategy" => strategy.to_string()
    )
    .record(duration_secs);

    counter!(
        format!("{}_destination_resolutions_total", METRICS_PREFIX),
        "stage" => destination_stage.to_string()
    )
    .increment(1);
}

/// Helper to record a capability outage that was absorbed by a fallback
pub fn record_capability_failure(capability: &str, backend: &str) {
    counter!(
        format!("{}_capability_failures_total", METRICS_PREFIX),
        "capability" => capability.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
}

/// Helper to record an issued booking
pub fn record_booking(kind: &str) {
    counter!(
        format!("{}_bookings_total", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .increment(1);
}
