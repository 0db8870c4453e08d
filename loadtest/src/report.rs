use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::executor::Outcome;
use crate::statistics::AggregateStats;

pub const DEFAULT_ARTIFACT_PATH: &str = "load_test_results.json";

/// The structured artifact: aggregated statistics plus every raw outcome in
/// arrival order, for machine consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTestReport {
    #[serde(flatten)]
    pub stats: AggregateStats,
    pub detailed_results: Vec<Outcome>,
}

impl LoadTestReport {
    #[must_use]
    pub fn new(stats: AggregateStats, detailed_results: Vec<Outcome>) -> Self {
        Self {
            stats,
            detailed_results,
        }
    }

    /// Persists the artifact. Write failures surface as errors, the caller
    /// still holds the in-memory report either way.
    pub fn write_to(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let raw = serde_json::to_vec_pretty(self).context("failed to serialize report")?;
        std::fs::write(path, raw)
            .with_context(|| format!("failed to write results to {}", path.display()))
    }
}

/// Human-readable summary, printed after every run regardless of failure rate.
#[must_use]
pub fn render_text(stats: &AggregateStats) -> String {
    let s = &stats.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "LOAD TEST REPORT");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Total time: {:.2} seconds", s.total_time);
    let _ = writeln!(out, "Total requests: {}", s.total_requests);
    let _ = writeln!(out, "Successful requests: {}", s.successful_requests);
    let _ = writeln!(out, "Failed requests: {}", s.failed_requests);
    let _ = writeln!(out, "Success rate: {:.2}%", s.success_rate);
    let _ = writeln!(out, "Average response time: {:.2} ms", s.avg_response_time);
    let _ = writeln!(out, "Min response time: {:.2} ms", s.min_response_time);
    let _ = writeln!(out, "Max response time: {:.2} ms", s.max_response_time);
    let _ = writeln!(out, "Requests per second: {:.2}", s.requests_per_second);
    let _ = writeln!(out, "\nPER-ENDPOINT STATISTICS:");
    let _ = writeln!(out, "{}", "-".repeat(50));
    for (endpoint, stats) in &stats.endpoint_stats {
        let _ = writeln!(out, "{endpoint}:");
        let _ = writeln!(out, "  - Total: {}", stats.total_requests);
        let _ = writeln!(out, "  - Successful: {}", stats.successful_requests);
        let _ = writeln!(out, "  - Success rate: {:.2}%", stats.success_rate);
        let _ = writeln!(out, "  - Average time: {:.2} ms", stats.avg_response_time);
    }
    out
}
