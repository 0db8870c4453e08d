use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::Full;
use http_load_util::drain::DiscardBodyFuture;
use hyper::{Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

/// Thin wrapper over the pooled hyper client. Each worker builds its own so
/// connections are never shared across workers.
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpClient {
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }

    /// Sends the request and drains the response body unread, only the
    /// status line matters to the load generator.
    pub async fn send_for_status(&mut self, request: Request<Full<Bytes>>) -> Result<StatusCode> {
        let resp = self
            .client
            .request(request)
            .await
            .context("failed to send request")?;
        let status = resp.status();
        DiscardBodyFuture::new(resp.into_body())
            .await
            .context("failed to drain response body")?;
        Ok(status)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
