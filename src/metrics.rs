// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the DNSPod webhook.
//!
//! All metrics carry the `dnspod_webhook_` prefix and are exposed on `/metrics`.
//!
//! # Example
//!
//! ```rust,no_run
//! use dnspod_webhook::metrics::record_challenge;
//!
//! record_challenge("dnspodchallenger", "present", true, std::time::Duration::from_millis(850));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all webhook metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "dnspod_webhook";

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of challenge operations by solver, action and result
///
/// Labels:
/// - `solver`: Solver name (e.g., `dnspodchallenger`)
/// - `action`: `present` or `cleanup`
/// - `result`: `success` or `error`
pub static CHALLENGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_challenges_total"),
        "Total number of challenge operations by solver, action and result",
    );
    let counter = CounterVec::new(opts, &["solver", "action", "result"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of challenge operations in seconds
pub static CHALLENGE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_challenge_duration_seconds"),
        "Duration of challenge operations in seconds by solver and action",
    )
    .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["solver", "action"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Record the outcome and duration of one challenge operation.
pub fn record_challenge(solver: &str, action: &str, success: bool, duration: Duration) {
    let result = if success { "success" } else { "error" };
    CHALLENGES_TOTAL
        .with_label_values(&[solver, action, result])
        .inc();
    CHALLENGE_DURATION_SECONDS
        .with_label_values(&[solver, action])
        .observe(duration.as_secs_f64());
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
