use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECONDS: f64 = 10.0;

/// Run parameters, every field has a default and a partial JSON file
/// overrides only what it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTestConfig {
    pub base_url: String,
    pub total_requests: usize,
    pub worker_count: usize,
    pub endpoints: Vec<String>,
    pub request_timeout_seconds: f64,
    pub inter_iteration_delay_seconds: f64,
    pub common_headers: BTreeMap<String, String>,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            total_requests: 20_000,
            worker_count: 50,
            endpoints: vec![
                "/actuator/health".to_string(),
                "/actuator/info".to_string(),
                "/actuator/prometheus".to_string(),
                "/api/specialties".to_string(),
                "/api/states".to_string(),
                "/api/parameters".to_string(),
            ],
            request_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            inter_iteration_delay_seconds: 0.01,
            common_headers: BTreeMap::from([
                ("Content-Type".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), "LoadTest/1.0".to_string()),
            ]),
        }
    }
}

impl LoadTestConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would make the run meaningless. Called
    /// before any worker is launched.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.total_requests == 0 {
            bail!("total_requests must be greater than zero");
        }
        if self.worker_count == 0 {
            bail!("worker_count must be greater than zero");
        }
        if self.endpoints.is_empty() {
            bail!("at least one endpoint is required");
        }
        if !(self.request_timeout_seconds > 0.0) {
            bail!("request_timeout_seconds must be positive");
        }
        if !(self.inter_iteration_delay_seconds >= 0.0) {
            bail!("inter_iteration_delay_seconds must not be negative");
        }
        Ok(())
    }

    /// Values validate() would reject fall back to the default instead of
    /// panicking inside `Duration::from_secs_f64`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        if self.request_timeout_seconds.is_finite() && self.request_timeout_seconds > 0.0 {
            Duration::from_secs_f64(self.request_timeout_seconds)
        } else {
            Duration::from_secs_f64(DEFAULT_TIMEOUT_SECONDS)
        }
    }

    #[must_use]
    pub fn iteration_delay(&self) -> Duration {
        if self.inter_iteration_delay_seconds.is_finite()
            && self.inter_iteration_delay_seconds > 0.0
        {
            Duration::from_secs_f64(self.inter_iteration_delay_seconds)
        } else {
            Duration::ZERO
        }
    }
}
