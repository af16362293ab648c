//! HTTP transport.
//!
//! A small GET-only JSON API over the [`ReadGateway`]:
//!
//! - `/temp`, `/cpu`, `/gpu`, `/volts`, `/throttled`, `/memFree`,
//!   `/memTotal`, `/memSwap`, `/memSwapTotal` return `{"data": "<value>"}`
//! - `/raw` returns the in-memory history of every metric
//! - `/raw/<kind>` returns the history of one metric
//!
//! Handlers only call into the gateway, which never blocks, so no request
//! waits on the sampler.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::core::stats::{MetricKind, ReadGateway, Route};
use crate::error::{Result, StatError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Status and JSON body of a handled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status: StatusCode::OK,
                body,
            },
            Err(e) => {
                log::error!("Failed to serialize response: {}", e);
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, "serialization failed")
            }
        }
    }

    fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

/// Map a request line onto the gateway
pub fn route_request(method: &Method, path: &str, gateway: &ReadGateway) -> Reply {
    if *method != Method::GET {
        return Reply::error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    }

    if let Some(route) = Route::from_path(path) {
        return Reply::json(&gateway.read(route));
    }

    match path.strip_prefix("/raw") {
        Some("") | Some("/") => Reply::json(&gateway.raw_all()),
        Some(rest) => match rest.strip_prefix('/').and_then(MetricKind::from_name) {
            Some(kind) => Reply::json(&gateway.raw_snapshot(kind)),
            None => Reply::error(StatusCode::NOT_FOUND, "not found"),
        },
        None => Reply::error(StatusCode::NOT_FOUND, "not found"),
    }
}

/// Bind the API listener on all interfaces
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr)
        .await
        .map_err(|e| StatError::server(format!("could not bind {addr}: {e}")))
}

/// Accept connections until `shutdown` fires.
///
/// A failed `accept` is logged and retried; it never ends the loop.
pub async fn serve(
    listener: TcpListener,
    gateway: Arc<ReadGateway>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Serving stats on http://{}", addr);
    }

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    // Transient (EMFILE, ECONNABORTED), the listener is still usable
                    log::error!("Accept error: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            },
            _ = shutdown.recv() => {
                log::info!("HTTP server shutting down");
                return Ok(());
            }
        };

        let io = TokioIo::new(stream);
        let gateway = gateway.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let gateway = gateway.clone();
                async move {
                    let reply = route_request(req.method(), req.uri().path(), &gateway);
                    log::debug!(
                        "{} {} {} -> {}",
                        peer,
                        req.method(),
                        req.uri().path(),
                        reply.status
                    );
                    Ok::<_, Infallible>(reply.into_response())
                }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                log::debug!("Connection from {} ended with error: {}", peer, e);
            }
        });
    }
}
