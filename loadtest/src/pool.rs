use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::LoadTestConfig;
use crate::executor::{Outcome, RequestExecutor};
use crate::partition::{EndpointSelector, WorkloadPartitioner};

const PROGRESS_LOG_EVERY: usize = 10;

/// Runs every worker to completion and returns one outcome list per worker.
/// Outcomes travel over a per-worker channel, so a worker that dies mid-run
/// still contributes the iterations it finished, the pool never crashes.
pub(crate) async fn run_workers(
    config: Arc<LoadTestConfig>,
    partitioner: &WorkloadPartitioner,
) -> Vec<Vec<Outcome>> {
    let iterations = partitioner.iterations_per_worker();
    let mut handles = Vec::with_capacity(config.worker_count);
    for worker_id in 0..config.worker_count {
        let (tx, rx) = mpsc::unbounded_channel();
        let selector = partitioner.selector_for(worker_id);
        let worker_config = Arc::clone(&config);
        let handle = tokio::spawn(worker_loop(
            worker_id,
            iterations,
            selector,
            worker_config,
            tx,
        ));
        handles.push((handle, rx));
    }
    // Full join barrier, no partial consumption before every worker is done.
    let mut results = Vec::with_capacity(config.worker_count);
    for (worker_id, (handle, mut rx)) in handles.into_iter().enumerate() {
        if let Err(e) = handle.await {
            warn!(worker_id, "worker aborted, keeping partial results: {e}");
        }
        let mut outcomes = Vec::with_capacity(iterations);
        while let Ok(outcome) = rx.try_recv() {
            outcomes.push(outcome);
        }
        results.push(outcomes);
    }
    results
}

async fn worker_loop(
    worker_id: usize,
    iterations: usize,
    mut selector: EndpointSelector,
    config: Arc<LoadTestConfig>,
    tx: mpsc::UnboundedSender<Outcome>,
) {
    let mut executor = RequestExecutor::new(&config);
    let delay = config.iteration_delay();
    for i in 0..iterations {
        let endpoint = selector.pick();
        let outcome = executor.execute(endpoint).await;
        if tx.send(outcome).is_err() {
            return;
        }
        if (i + 1) % PROGRESS_LOG_EVERY == 0 {
            debug!(worker_id, completed = i + 1, "worker progress");
        }
        tokio::time::sleep(delay).await;
    }
}
