//! Authenticated request executor for the Jules API.
//!
//! Every tool ends up here: a [`RemoteCall`] describes one request (method, relative path,
//! query, optional JSON body) and [`JulesClient::execute`] performs exactly one round trip,
//! returning the decoded payload or a classified [`ApiError`].

use crate::config::{API_KEY_HEADER, ApiConfig};
use crate::error::{ApiError, ErrorDetail, Result};
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Description of a single API request. Built per invocation, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RemoteCall {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Add a query parameter.
    ///
    /// Absent, `null` and empty-string values are dropped so optional arguments never show up as
    /// `key=` on the wire. Setting a key twice keeps the last value.
    #[must_use]
    pub fn query<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        let Some(value) = value.map(Into::into) else {
            return self;
        };
        if query_value_is_empty(&value) {
            return self;
        }

        let value = value_to_string(&value);
        if let Some(existing) = self.query.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value;
        } else {
            self.query.push((key.to_string(), value));
        }
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// Shared, cheaply clonable Jules API client.
#[derive(Clone)]
pub struct JulesClient {
    inner: Arc<JulesClientInner>,
}

struct JulesClientInner {
    config: ApiConfig,
    client: Client,
}

impl JulesClient {
    /// Build a client for the given configuration.
    ///
    /// No request timeout is configured; calls run until the platform gives up.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jules-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::from)?;
        Ok(Self {
            inner: Arc::new(JulesClientInner { config, client }),
        })
    }

    /// Resolve a call's path and query against the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the path cannot be joined onto the base URL.
    pub fn build_url(&self, call: &RemoteCall) -> Result<Url> {
        let path = call.path.strip_prefix('/').unwrap_or(&call.path);
        let mut url = self
            .inner
            .config
            .base_url()
            .join(path)
            .map_err(|e| ApiError::InvalidRequest(format!("path '{path}': {e}")))?;

        if !call.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(call.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        Ok(url)
    }

    /// Execute one request.
    ///
    /// Returns `Ok(None)` when the API answers with an empty success body. Success bodies that
    /// are not JSON are returned verbatim as a JSON string.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Configuration`] if no credential is configured (no request is sent)
    /// - [`ApiError::Remote`] for any non-2xx response
    /// - [`ApiError::Transport`] if the round trip itself fails
    pub async fn execute(&self, call: RemoteCall) -> Result<Option<Value>> {
        let api_key = self.inner.config.api_key()?;
        let url = self.build_url(&call)?;

        let mut request = self
            .inner
            .client
            .request(call.method.clone(), url)
            .header(API_KEY_HEADER, api_key);
        if call.method != Method::GET
            && let Some(body) = call.body.as_ref()
        {
            request = request.json(body);
        }

        debug!(method = %call.method, path = %call.path, "calling Jules API");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(
            method = %call.method,
            path = %call.path,
            status = status.as_u16(),
            bytes = text.len(),
            "Jules API responded"
        );

        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("Unknown").to_string();
            warn!(
                method = %call.method,
                path = %call.path,
                status = status.as_u16(),
                "Jules API returned an error"
            );
            return Err(ApiError::Remote {
                status: status.as_u16(),
                status_text,
                detail: ErrorDetail::from_body(&text),
            });
        }

        if text.is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(v) => Ok(Some(v)),
            Err(_) => Ok(Some(Value::String(text))),
        }
    }
}

/// Percent-encode a single path segment (e.g. a session id).
///
/// Leaves only `A-Z a-z 0-9 - _ . ! ~ * ' ( )` untouched, so `/`, `:` and `?` inside an id can
/// never change which resource or custom method is addressed.
#[must_use]
pub fn encode_path_segment(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_segment_safe(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

fn is_segment_safe(b: u8) -> bool {
    matches!(
        b,
        b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')'
    )
}

fn query_value_is_empty(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Null => true,
        _ => false,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jules_test_support::{MockJulesApi, MockResponse};
    use serde_json::json;

    fn client_for(base_url: &str, api_key: Option<&str>) -> JulesClient {
        let cfg = ApiConfig::new(base_url, api_key.map(str::to_string)).expect("valid config");
        JulesClient::new(cfg).expect("client")
    }

    #[test]
    fn query_skips_absent_and_empty_values() {
        let call = RemoteCall::get("sources")
            .query::<u64>("pageSize", None)
            .query("pageToken", Some(""))
            .query("filter", Some(Value::Null))
            .query("pageSize", Some(50_u64));
        assert_eq!(
            call.query_pairs(),
            &[("pageSize".to_string(), "50".to_string())]
        );
    }

    #[test]
    fn query_last_write_wins() {
        let call = RemoteCall::get("sessions")
            .query("pageToken", Some("a"))
            .query("pageToken", Some("b"));
        assert_eq!(
            call.query_pairs(),
            &[("pageToken".to_string(), "b".to_string())]
        );
    }

    #[test]
    fn build_url_strips_leading_slash_and_omits_empty_query() {
        let client = client_for("http://127.0.0.1:9/v1alpha", Some("k"));

        let url = client
            .build_url(&RemoteCall::get("/sources"))
            .expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:9/v1alpha/sources");
        assert_eq!(url.query(), None);

        let url = client
            .build_url(
                &RemoteCall::get("sessions/abc/activities")
                    .query("pageSize", Some(10_u64))
                    .query("pageToken", Some("next page")),
            )
            .expect("url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/v1alpha/sessions/abc/activities?pageSize=10&pageToken=next+page"
        );
    }

    #[test]
    fn build_url_reports_unjoinable_paths_as_invalid_requests() {
        let client = client_for("http://127.0.0.1:9/v1alpha", Some("k"));
        let err = client
            .build_url(&RemoteCall::get("http://[broken"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)), "{err}");
    }

    #[test]
    fn encode_path_segment_matches_uri_component_rules() {
        assert_eq!(encode_path_segment("abc-123_x.y"), "abc-123_x.y");
        assert_eq!(encode_path_segment("a/b:c?d"), "a%2Fb%3Ac%3Fd");
        assert_eq!(encode_path_segment("it's (ok)*!~"), "it's%20(ok)*!~");
        assert_eq!(encode_path_segment("é"), "%C3%A9");
    }

    #[tokio::test]
    async fn execute_sends_credential_and_json_body() {
        let api = MockJulesApi::start().await.expect("mock api");
        api.respond(
            "POST",
            "sessions",
            MockResponse::json(200, json!({"name": "sessions/1"})),
        );

        let client = client_for(api.base_url(), Some("test-key"));
        let out = client
            .execute(RemoteCall::post("sessions", json!({"prompt": "hi"})))
            .await
            .expect("execute");
        assert_eq!(out, Some(json!({"name": "sessions/1"})));

        let reqs = api.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method, "POST");
        assert_eq!(reqs[0].path, "sessions");
        assert_eq!(reqs[0].api_key.as_deref(), Some("test-key"));
        assert_eq!(reqs[0].content_type.as_deref(), Some("application/json"));
        assert_eq!(reqs[0].json_body(), Some(json!({"prompt": "hi"})));
    }

    #[tokio::test]
    async fn execute_get_has_no_body_and_no_query_string_by_default() {
        let api = MockJulesApi::start().await.expect("mock api");
        api.respond("GET", "sources", MockResponse::json(200, json!({"sources": []})));

        let client = client_for(api.base_url(), Some("k"));
        client
            .execute(RemoteCall::get("sources").query::<u64>("pageSize", None))
            .await
            .expect("execute");

        let reqs = api.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].query, None);
        assert!(reqs[0].body.is_empty());
        assert_eq!(reqs[0].content_type, None);
    }

    #[tokio::test]
    async fn execute_without_credential_fails_before_any_request() {
        let api = MockJulesApi::start().await.expect("mock api");
        let client = client_for(api.base_url(), None);

        let err = client
            .execute(RemoteCall::get("sources"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn execute_surfaces_remote_errors_with_decoded_body() {
        let api = MockJulesApi::start().await.expect("mock api");
        api.respond(
            "GET",
            "sessions/missing/activities",
            MockResponse::json(
                404,
                json!({"error": {"code": 404, "message": "Session not found"}}),
            ),
        );
        api.respond(
            "GET",
            "sources",
            MockResponse::text(502, "upstream exploded"),
        );

        let client = client_for(api.base_url(), Some("k"));

        let err = client
            .execute(RemoteCall::get("sessions/missing/activities"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        let msg = err.to_string();
        assert!(msg.starts_with("Jules API 404 Not Found:"), "{msg}");
        assert!(msg.contains("\"message\": \"Session not found\""), "{msg}");

        let err = client.execute(RemoteCall::get("sources")).await.unwrap_err();
        match err {
            ApiError::Remote {
                status,
                status_text,
                detail,
            } => {
                assert_eq!(status, 502);
                assert_eq!(status_text, "Bad Gateway");
                assert_eq!(detail, ErrorDetail::Text("upstream exploded".to_string()));
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn execute_decodes_empty_and_non_json_success_bodies() {
        let api = MockJulesApi::start().await.expect("mock api");
        api.respond("POST", "sessions/1:approvePlan", MockResponse::empty(200));
        api.respond("GET", "sources", MockResponse::text(200, "not json"));

        let client = client_for(api.base_url(), Some("k"));

        let out = client
            .execute(RemoteCall::post("sessions/1:approvePlan", json!({})))
            .await
            .expect("execute");
        assert_eq!(out, None);

        let out = client
            .execute(RemoteCall::get("sources"))
            .await
            .expect("execute");
        assert_eq!(out, Some(Value::String("not json".to_string())));
    }

    #[tokio::test]
    async fn execute_reports_transport_failures() {
        // Nothing listens on port 9 locally.
        let client = client_for("http://127.0.0.1:9/v1alpha/", Some("k"));
        let err = client
            .execute(RemoteCall::get("sources").query("pageToken", Some("secret-token")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!err.to_string().contains("secret-token"));
    }
}
