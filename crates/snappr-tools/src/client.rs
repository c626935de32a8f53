//! Authenticated HTTP client for the Snappr API.
//!
//! One long-lived `reqwest::Client` is shared by every tool call. Each call is a single attempt:
//! no retries, no backoff, no pagination.

use crate::config::SnapprConfig;
use crate::error::{Result, SnapprError};
use crate::safety::redact_url;
use crate::semantics::HttpMethod;
use base64::Engine as _;
use mime::Mime;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const USER_AGENT: &str = concat!("snappr-mcp/", env!("CARGO_PKG_VERSION"));
pub const ACCEPT_VERSION: &str = "1.0.0";

/// A successful upstream response.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamResponse {
    /// JSON body (an empty body is `null`, a non-JSON text body is a JSON string).
    Json(Value),
    /// Binary media (images, videos) returned as raw bytes.
    Binary { bytes: Vec<u8>, mime_type: String },
}

#[derive(Clone)]
pub struct SnapprClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    timeout: Option<Duration>,
}

impl SnapprClient {
    /// Build the client for a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &SnapprConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("accept-version", HeaderValue::from_static(ACCEPT_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| SnapprError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url().clone(),
            api_key: config.api_key().expose().to_string(),
            timeout: config.timeout(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path (relative to the base URL) plus query pairs into a full URL.
    ///
    /// `path` must already be percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint_url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| SnapprError::Config(format!("Invalid endpoint path '{path}': {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// `GET` a Snappr endpoint.
    ///
    /// # Errors
    ///
    /// See [`SnapprClient::request`].
    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<UpstreamResponse> {
        self.request(HttpMethod::Get, path, query, None).await
    }

    /// `POST` a JSON body to a Snappr endpoint.
    ///
    /// # Errors
    ///
    /// See [`SnapprClient::request`].
    pub async fn post(&self, path: &str, body: &Value) -> Result<UpstreamResponse> {
        self.request(HttpMethod::Post, path, &[], Some(body)).await
    }

    /// Perform one authenticated request.
    ///
    /// # Errors
    ///
    /// - [`SnapprError::Upstream`] for non-2xx responses (status + upstream body, verbatim)
    /// - [`SnapprError::Transport`] for connect failures, timeouts and unreadable bodies
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<UpstreamResponse> {
        let url = self.endpoint_url(path, query)?;
        let redacted = redact_url(&url);

        let mut request = self
            .http
            .request(method.to_reqwest(), url)
            .bearer_auth(&self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        debug!(
            method = %method,
            url = %redacted,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis(),
            bytes = bytes.len(),
            "snappr api response"
        );

        if status.is_success() {
            if is_binary_media(content_type.as_deref()) {
                let mime_type =
                    content_type.unwrap_or_else(|| "application/octet-stream".to_string());
                return Ok(UpstreamResponse::Binary {
                    bytes: bytes.to_vec(),
                    mime_type,
                });
            }
            Ok(UpstreamResponse::Json(parse_body(
                &bytes,
                content_type.as_deref(),
            )))
        } else {
            Err(SnapprError::Upstream {
                status: status.as_u16(),
                body: parse_body(&bytes, content_type.as_deref()),
            })
        }
    }
}

impl std::fmt::Debug for SnapprClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapprClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn is_binary_media(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type else {
        return false;
    };
    let Ok(m) = ct.parse::<Mime>() else {
        return false;
    };
    m.type_() == mime::IMAGE
        || m.type_() == mime::VIDEO
        || m.essence_str() == "application/octet-stream"
}

/// Decode a response body: JSON when it parses, otherwise text, otherwise a base64 envelope.
fn parse_body(bytes: &[u8], content_type: Option<&str>) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    if let Ok(v) = serde_json::from_slice::<Value>(bytes) {
        return v;
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => Value::String(s.to_string()),
        Err(_) => json!({
            "encoding": "base64",
            "mimeType": content_type,
            "data": base64::engine::general_purpose::STANDARD.encode(bytes),
        }),
    }
}
