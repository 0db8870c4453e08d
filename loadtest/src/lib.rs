//! Concurrent HTTP load generator: a fixed worker pool drives GET requests
//! against a set of endpoints, per-worker outcomes are merged after a full
//! join into global and per-endpoint latency and success-rate statistics.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

pub mod client;
pub mod config;
pub mod executor;
pub mod partition;
mod pool;
pub mod report;
pub mod statistics;

pub use config::LoadTestConfig;
pub use executor::{Outcome, RequestExecutor};
pub use partition::WorkloadPartitioner;
pub use report::LoadTestReport;
pub use statistics::{aggregate, AggregateStats};

/// Runs the full load test: validate, fan out workers, join, aggregate,
/// print the text report. Returns the structured report for the caller to
/// persist or inspect.
pub async fn run(config: LoadTestConfig) -> anyhow::Result<LoadTestReport> {
    run_with_seed(config, None).await
}

/// Same as [`run`] but with an injectable base seed for deterministic
/// endpoint selection in tests.
pub async fn run_with_seed(
    config: LoadTestConfig,
    seed: Option<u64>,
) -> anyhow::Result<LoadTestReport> {
    config.validate()?;
    info!(
        base_url = %config.base_url,
        total_requests = config.total_requests,
        worker_count = config.worker_count,
        endpoints = ?config.endpoints,
        "starting load test"
    );
    let partitioner = WorkloadPartitioner::new(&config, seed);
    let config = Arc::new(config);
    let started = Instant::now();
    let worker_results = pool::run_workers(Arc::clone(&config), &partitioner).await;
    let wall_clock = started.elapsed();
    let outcomes: Vec<Outcome> = worker_results.into_iter().flatten().collect();
    let stats = statistics::aggregate(&outcomes, wall_clock);
    println!("{}", report::render_text(&stats));
    Ok(LoadTestReport::new(stats, outcomes))
}
