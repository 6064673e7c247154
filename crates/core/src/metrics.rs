//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Reconciliation passes (duration, per-hit decisions)
//! - Source adapters (requests, hits returned)
//! - Name cache (rows written, lookups)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Reconciliation
// =============================================================================

/// Search passes by mode.
pub static PASSES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_passes_total", "Total reconciliation passes"),
        &["mode"], // "eponly", "sponly", "rss"
    )
    .unwrap()
});

/// Pass duration in seconds.
pub static PASS_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trawler_pass_duration_seconds",
            "Duration of a reconciliation pass",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["mode"],
    )
    .unwrap()
});

/// Hit decisions.
pub static HIT_DECISIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_hit_decisions_total", "Raw hits by decision"),
        &["decision"], // "accepted", "cached", "unparseable", "unwanted", ...
    )
    .unwrap()
});

// =============================================================================
// Source adapters
// =============================================================================

/// Adapter requests by source and status.
pub static ADAPTER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_adapter_requests_total", "Source adapter requests"),
        &["source", "status"], // status: "success", "auth_error", "error"
    )
    .unwrap()
});

/// Raw hits returned per adapter request.
pub static ADAPTER_HITS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("trawler_adapter_hits", "Raw hits per adapter request")
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
        &["source"],
    )
    .unwrap()
});

// =============================================================================
// Name cache
// =============================================================================

/// Cache rows written.
pub static CACHE_ROWS_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("trawler_cache_rows_written_total", "Name cache rows written").unwrap()
});

/// Cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trawler_cache_lookups_total", "Name cache lookups"),
        &["result"], // "hit", "miss", "error"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Reconciliation
        Box::new(PASSES_TOTAL.clone()),
        Box::new(PASS_DURATION.clone()),
        Box::new(HIT_DECISIONS.clone()),
        // Source adapters
        Box::new(ADAPTER_REQUESTS.clone()),
        Box::new(ADAPTER_HITS.clone()),
        // Name cache
        Box::new(CACHE_ROWS_WRITTEN.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
    ]
}
