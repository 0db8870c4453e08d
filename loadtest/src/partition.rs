use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::LoadTestConfig;

/// Splits the request budget evenly across workers. `total mod workers`
/// requests are dropped rather than redistributed, matching the documented
/// budget policy.
pub struct WorkloadPartitioner {
    iterations_per_worker: usize,
    endpoints: Arc<[String]>,
    seed: Option<u64>,
}

impl WorkloadPartitioner {
    #[must_use]
    pub fn new(config: &LoadTestConfig, seed: Option<u64>) -> Self {
        Self {
            iterations_per_worker: config.total_requests / config.worker_count,
            endpoints: config.endpoints.clone().into(),
            seed,
        }
    }

    #[must_use]
    pub fn iterations_per_worker(&self) -> usize {
        self.iterations_per_worker
    }

    /// Per-worker endpoint source. Workers never share an RNG; with a base
    /// seed each worker gets its own deterministic stream.
    #[must_use]
    pub fn selector_for(&self, worker_id: usize) -> EndpointSelector {
        let rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(worker_id as u64)),
            None => SmallRng::from_entropy(),
        };
        EndpointSelector {
            endpoints: Arc::clone(&self.endpoints),
            rng,
        }
    }
}

/// Uniform pick over the configured endpoint list, one call per iteration.
pub struct EndpointSelector {
    endpoints: Arc<[String]>,
    rng: SmallRng,
}

impl EndpointSelector {
    pub fn pick(&mut self) -> &str {
        let idx = self.rng.gen_range(0..self.endpoints.len());
        &self.endpoints[idx]
    }
}
