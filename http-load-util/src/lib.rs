pub mod drain;

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

#[inline]
pub fn empty_body() -> Full<Bytes> {
    Full::new(Bytes::new())
}

#[inline]
pub fn byte_body<B: Into<Bytes>>(bytes: B) -> Full<Bytes> {
    Full::new(bytes.into())
}

/// How a stub route answers a request.
#[derive(Debug, Copy, Clone)]
pub enum RouteBehavior {
    /// Immediately respond with this status.
    Respond(u16),
    /// Respond with this status after the delay has passed.
    RespondAfter(u16, Duration),
    /// Never respond within any reasonable timeout.
    Hang,
}

struct Route {
    behavior: RouteBehavior,
    hits: AtomicUsize,
}

/// In-process http1 server with fixed per-path behavior, bound to an
/// ephemeral localhost port. Counts hits per route.
pub struct StubServer {
    addr: SocketAddr,
    routes: Arc<HashMap<String, Route>>,
}

impl StubServer {
    pub async fn start(routes: &[(&str, RouteBehavior)]) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind stub server")?;
        let addr = listener
            .local_addr()
            .context("failed to resolve stub server address")?;
        let routes: Arc<HashMap<String, Route>> = Arc::new(
            routes
                .iter()
                .map(|(path, behavior)| {
                    (
                        (*path).to_string(),
                        Route {
                            behavior: *behavior,
                            hits: AtomicUsize::new(0),
                        },
                    )
                })
                .collect(),
        );
        let accept_routes = Arc::clone(&routes);
        tokio::spawn(async move {
            loop {
                let Ok((tcp, _peer)) = listener.accept().await else {
                    return;
                };
                let tcp = TokioIo::new(tcp);
                let conn_routes = Arc::clone(&accept_routes);
                tokio::spawn(
                    hyper::server::conn::http1::Builder::new().serve_connection(
                        tcp,
                        service_fn(move |req| stub_service(Arc::clone(&conn_routes), req)),
                    ),
                );
            }
        });
        Ok(Self { addr, routes })
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests this route has received so far.
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        self.routes
            .get(path)
            .map_or(0, |route| route.hits.load(Ordering::Acquire))
    }
}

async fn stub_service(
    routes: Arc<HashMap<String, Route>>,
    incoming: Request<hyper::body::Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = incoming.uri().path();
    let Some(route) = routes.get(path) else {
        return Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(empty_body())
            .unwrap());
    };
    route.hits.fetch_add(1, Ordering::AcqRel);
    let status = match route.behavior {
        RouteBehavior::Respond(status) => status,
        RouteBehavior::RespondAfter(status, delay) => {
            tokio::time::sleep(delay).await;
            status
        }
        RouteBehavior::Hang => {
            tokio::time::sleep(Duration::from_secs(60 * 60)).await;
            StatusCode::OK.as_u16()
        }
    };
    Ok(Response::builder()
        .status(StatusCode::from_u16(status).unwrap_or(StatusCode::OK))
        .body(byte_body(&b"stub"[..]))
        .unwrap())
}
