//! Shared test helpers for the `jules-mcp` workspace.
//!
//! [`MockJulesApi`] is an in-process HTTP server standing in for the Jules API. It records every
//! request and answers with canned responses keyed by `METHOD path`.

use anyhow::Context as _;
use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Path prefix the mock serves under, mirroring the real API's version segment.
pub const API_PREFIX: &str = "/v1alpha/";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Raw (still percent-encoded) path relative to [`API_PREFIX`].
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// The request body parsed as JSON, if it is JSON.
    #[must_use]
    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Canned response for a route.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    body: String,
    content_type: Option<&'static str>,
}

impl MockResponse {
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: Some("application/json"),
        }
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_type: Some("text/plain"),
        }
    }

    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            content_type: None,
        }
    }
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(String, String), MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process stand-in for the Jules API.
///
/// Unrouted requests get `200` with a JSON echo of what was received, so tests that only care
/// about the outgoing request do not need to register anything.
pub struct MockJulesApi {
    base_url: String,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockJulesApi {
    /// Bind an ephemeral localhost port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());
        let handler_state = Arc::clone(&state);
        let app = Router::new().route(
            "/{*path}",
            any(move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
                let state = Arc::clone(&handler_state);
                async move { handle(&state, &method, &uri, &headers, &body) }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock api listener")?;
        let addr = listener.local_addr().context("mock api local_addr")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move {
            let _ = server.await;
        });

        Ok(Self {
            base_url: format!("http://{addr}{API_PREFIX}"),
            state,
            shutdown: Some(shutdown_tx),
        })
    }

    /// Base URL including the version prefix and trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answer `method path` (path relative to [`API_PREFIX`], percent-encoded as sent).
    pub fn respond(&self, method: &str, path: &str, response: MockResponse) {
        self.state
            .routes
            .lock()
            .insert((method.to_ascii_uppercase(), path.to_string()), response);
    }

    /// Everything received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }
}

impl Drop for MockJulesApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn handle(
    state: &MockState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let recorded = RecordedRequest {
        method: method.as_str().to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        api_key: header_str("x-goog-api-key"),
        content_type: header_str(header::CONTENT_TYPE.as_str()),
        body: String::from_utf8_lossy(body).into_owned(),
    };
    state.requests.lock().push(recorded.clone());

    let canned = state
        .routes
        .lock()
        .get(&(method.as_str().to_string(), path))
        .cloned();

    match canned {
        Some(resp) => {
            let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::OK);
            match resp.content_type {
                Some(ct) => (status, [(header::CONTENT_TYPE, ct)], resp.body).into_response(),
                None => (status, resp.body).into_response(),
            }
        }
        None => axum::Json(json!({
            "method": recorded.method,
            "path": recorded.path,
            "query": recorded.query,
            "body": recorded.json_body(),
        }))
        .into_response(),
    }
}
