//! Rendering of pass results and metrics.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};

use trawler_core::{metrics, DownloadCandidate, SearchResults};

/// Results as pretty JSON, keyed by `episode:N`, `multi_episode` and
/// `full_season`.
pub fn results_json(results: &SearchResults) -> Result<String> {
    let keyed: BTreeMap<String, &Vec<DownloadCandidate>> = results
        .iter()
        .map(|(key, candidates)| (key.to_string(), candidates))
        .collect();
    serde_json::to_string_pretty(&keyed).context("Failed to serialize results")
}

/// Encode the engine's metrics in Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let registry = Registry::new();
    for collector in metrics::all_metrics() {
        registry
            .register(collector)
            .context("Failed to register metric")?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics are not valid UTF-8")
}
