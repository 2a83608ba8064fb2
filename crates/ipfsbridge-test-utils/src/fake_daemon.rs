//! A scriptable stand-in for the IPFS daemon HTTP API.
//!
//! [`FakeDaemon`] binds an axum server on an ephemeral localhost port, answers
//! each `/api/v0/<endpoint>` with a canned response, and records every request
//! it receives so tests can assert on query arguments and bodies.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::debug;

const API_PREFIX: &str = "/api/v0/";

/// A request as seen by the fake daemon.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Endpoint path relative to `/api/v0/`, e.g. `dag/put`.
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    /// `User-Agent` header, when one was sent.
    pub user_agent: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// First value of query parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Body as lossy UTF-8, handy for multipart payload assertions.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// What the fake daemon answers on one endpoint.
#[derive(Debug, Clone)]
pub enum CannedResponse {
    /// A complete body with the given status.
    Body { status: u16, body: String },
    /// A 200 body sent only after `delay`.
    Delayed { delay: Duration, body: String },
    /// A streamed 200 body. With `hold_open` the stream never ends after the
    /// last chunk.
    Stream { chunks: Vec<Vec<u8>>, hold_open: bool },
}

/// Builder for [`FakeDaemon`].
#[derive(Debug, Default)]
pub struct FakeDaemonBuilder {
    routes: HashMap<String, CannedResponse>,
}

impl FakeDaemonBuilder {
    /// Answer `endpoint` with `200` and a JSON body.
    pub fn json(self, endpoint: &str, body: serde_json::Value) -> Self {
        self.respond(
            endpoint,
            CannedResponse::Body {
                status: 200,
                body: body.to_string(),
            },
        )
    }

    /// Answer `endpoint` with an arbitrary status and raw body.
    pub fn status(self, endpoint: &str, status: u16, body: &str) -> Self {
        self.respond(
            endpoint,
            CannedResponse::Body {
                status,
                body: body.to_string(),
            },
        )
    }

    /// Answer `endpoint` with a JSON body after `delay`.
    pub fn delayed(self, endpoint: &str, delay: Duration, body: serde_json::Value) -> Self {
        self.respond(
            endpoint,
            CannedResponse::Delayed {
                delay,
                body: body.to_string(),
            },
        )
    }

    /// Stream `chunks` on `endpoint`.
    pub fn stream(self, endpoint: &str, chunks: Vec<Vec<u8>>, hold_open: bool) -> Self {
        self.respond(endpoint, CannedResponse::Stream { chunks, hold_open })
    }

    pub fn respond(mut self, endpoint: &str, response: CannedResponse) -> Self {
        self.routes.insert(endpoint.to_string(), response);
        self
    }

    /// Bind to `127.0.0.1:0` and start serving in the background.
    pub async fn start(self) -> FakeDaemon {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake daemon");
        let addr = listener
            .local_addr()
            .expect("fake daemon has no local address");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(DaemonState {
            routes: self.routes,
            requests: Arc::clone(&requests),
        });
        let app = Router::new().fallback(handle).with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        debug!(%addr, "fake daemon listening");
        FakeDaemon {
            base_url: format!("http://{addr}"),
            requests,
            shutdown: Some(shutdown_tx),
        }
    }
}

/// A running fake daemon. Stops serving when dropped.
pub struct FakeDaemon {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeDaemon {
    pub fn builder() -> FakeDaemonBuilder {
        FakeDaemonBuilder::default()
    }

    /// Base URL to put in `daemon.base_url`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Requests received on one endpoint.
    pub fn requests_to(&self, endpoint: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.endpoint == endpoint)
            .collect()
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

struct DaemonState {
    routes: HashMap<String, CannedResponse>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn handle(
    State(state): State<Arc<DaemonState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let endpoint = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();

    if let Ok(mut log) = state.requests.lock() {
        log.push(RecordedRequest {
            method,
            endpoint: endpoint.clone(),
            query,
            user_agent: headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: body.to_vec(),
        });
    }

    match state.routes.get(&endpoint).cloned() {
        None => (StatusCode::NOT_FOUND, "404 page not found").into_response(),
        Some(CannedResponse::Body { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            json_response(status, body)
        }
        Some(CannedResponse::Delayed { delay, body }) => {
            tokio::time::sleep(delay).await;
            json_response(StatusCode::OK, body)
        }
        Some(CannedResponse::Stream { chunks, hold_open }) => {
            let head = futures::stream::iter(
                chunks
                    .into_iter()
                    .map(|chunk| Ok::<_, Infallible>(Bytes::from(chunk))),
            );
            let body = if hold_open {
                Body::from_stream(head.chain(futures::stream::pending()))
            } else {
                Body::from_stream(head)
            };
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
