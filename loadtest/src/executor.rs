use std::time::Instant;

use anyhow::Context;
use http_load_util::empty_body;
use hyper::{Request, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::client::HttpClient;
use crate::config::LoadTestConfig;

/// The normalized result of one request attempt. `status_code` 0 marks a
/// transport-level failure where no status was ever received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub endpoint: String,
    pub status_code: u16,
    /// Milliseconds from request start to completion or failure.
    pub response_time: f64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Issues single GET attempts against `base_url + path` and converts every
/// possible result, including timeouts and connect errors, into an [`Outcome`].
pub struct RequestExecutor {
    client: HttpClient,
    base_url: String,
    headers: Vec<(String, String)>,
    timeout: std::time::Duration,
}

impl RequestExecutor {
    #[must_use]
    pub fn new(config: &LoadTestConfig) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: config.base_url.clone(),
            headers: config
                .common_headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            timeout: config.request_timeout(),
        }
    }

    /// One attempt, no retries. Never returns an error, transport failures
    /// become failed outcomes with the elapsed time up to the failure.
    pub async fn execute(&mut self, endpoint: &str) -> Outcome {
        let start = Instant::now();
        let sent = timeout(self.timeout, self.send(endpoint)).await;
        let response_time = start.elapsed().as_secs_f64() * 1000.0;
        match sent {
            Ok(Ok(status)) => Outcome {
                endpoint: endpoint.to_string(),
                status_code: status.as_u16(),
                response_time,
                success: status == StatusCode::OK,
                error: None,
            },
            Ok(Err(e)) => Outcome {
                endpoint: endpoint.to_string(),
                status_code: 0,
                response_time,
                success: false,
                error: Some(format!("{e:#}")),
            },
            Err(_elapsed) => Outcome {
                endpoint: endpoint.to_string(),
                status_code: 0,
                response_time,
                success: false,
                error: Some(format!("request timed out after {:?}", self.timeout)),
            },
        }
    }

    async fn send(&mut self, endpoint: &str) -> anyhow::Result<StatusCode> {
        let uri = format!("{}{}", self.base_url, endpoint);
        let mut request = Request::get(&uri);
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }
        let request = request
            .body(empty_body())
            .with_context(|| format!("failed to build request for {uri}"))?;
        self.client.send_for_status(request).await
    }
}
