//! Prometheus metrics for core components.
//!
//! This module provides metrics for aggregator requests (latency, outcome)
//! and search result volume. The server registers them alongside its own
//! HTTP metrics.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

/// Aggregator request duration in seconds.
pub static AGGREGATOR_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "torrentwave_aggregator_request_duration_seconds",
            "Duration of requests to the indexer aggregator",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["backend", "endpoint"], // endpoint: "search", "categories", "status"
    )
    .unwrap()
});

/// Aggregator requests by outcome.
pub static AGGREGATOR_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "torrentwave_aggregator_requests_total",
            "Total requests to the indexer aggregator",
        ),
        &["backend", "endpoint", "outcome"], // outcome: "success", "error"
    )
    .unwrap()
});

/// Records returned per search.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "torrentwave_search_results",
            "Number of records returned per search",
        )
        .buckets(vec![0.0, 1.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0]),
        &["backend"],
    )
    .unwrap()
});

/// Record the outcome and latency of one aggregator request.
pub(crate) fn observe_request(backend: &str, endpoint: &str, success: bool, seconds: f64) {
    AGGREGATOR_REQUEST_DURATION
        .with_label_values(&[backend, endpoint])
        .observe(seconds);
    AGGREGATOR_REQUESTS
        .with_label_values(&[backend, endpoint, if success { "success" } else { "error" }])
        .inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(AGGREGATOR_REQUEST_DURATION.clone()),
        Box::new(AGGREGATOR_REQUESTS.clone()),
        Box::new(SEARCH_RESULTS.clone()),
    ]
}
