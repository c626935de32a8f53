//! In-process fake of the Snappr API, for integration tests.
//!
//! [`MockSnappr`] serves the endpoints the MCP tools call, keeps bookings and editing jobs in
//! memory, and records every request it receives so tests can assert on method, path, query,
//! headers and body.

use anyhow::Context as _;
use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// A PNG signature, for binary media overrides.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to the mock's base URL, without a leading slash.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Clone)]
enum Canned {
    Json(StatusCode, Value),
    Raw(StatusCode, &'static str, Vec<u8>),
    Delay(Duration),
}

#[derive(Default)]
struct State {
    api_key: String,
    requests: Vec<RecordedRequest>,
    bookings: Vec<Value>,
    editing_jobs: Vec<Value>,
    overrides: HashMap<(String, String), Canned>,
}

pub struct MockSnappr {
    addr: SocketAddr,
    prefix: String,
    state: Arc<Mutex<State>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockSnappr {
    /// Start a fake Snappr API on an ephemeral localhost port, accepting `api_key` as bearer.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(api_key: &str) -> anyhow::Result<Self> {
        Self::start_with_prefix(api_key, "").await
    }

    /// Like [`MockSnappr::start`], but serving under a path prefix (e.g. `"v1"`), to exercise
    /// base URLs that carry a path.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start_with_prefix(api_key: &str, prefix: &str) -> anyhow::Result<Self> {
        let state = Arc::new(Mutex::new(State {
            api_key: api_key.to_string(),
            ..State::default()
        }));
        let prefix = prefix.trim_matches('/').to_string();

        let handler_state = Arc::clone(&state);
        let handler_prefix = prefix.clone();
        let app = Router::new().fallback(
            move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
                let state = Arc::clone(&handler_state);
                let prefix = handler_prefix.clone();
                async move { handle(&state, &prefix, method, &uri, &headers, &body).await }
            },
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind mock snappr listener")?;
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            prefix,
            state,
            shutdown: Some(tx),
        })
    }

    /// Base URL with a trailing slash, suitable for `SNAPPR_BASE_URL`.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.prefix.is_empty() {
            format!("http://{}/", self.addr)
        } else {
            format!("http://{}/{}/", self.addr, self.prefix)
        }
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.lock().requests.last().cloned()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Answer `method path` with a fixed JSON response instead of the built-in behavior.
    pub fn respond_with(&self, method: &str, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.insert_override(method, path, Canned::Json(status, body));
    }

    /// Answer `method path` with raw bytes of the given content type.
    pub fn respond_with_bytes(
        &self,
        method: &str,
        path: &str,
        content_type: &'static str,
        bytes: Vec<u8>,
    ) {
        self.insert_override(method, path, Canned::Raw(StatusCode::OK, content_type, bytes));
    }

    /// Sleep before answering `method path`, to provoke client timeouts.
    pub fn delay(&self, method: &str, path: &str, delay: Duration) {
        self.insert_override(method, path, Canned::Delay(delay));
    }

    fn insert_override(&self, method: &str, path: &str, canned: Canned) {
        self.state.lock().overrides.insert(
            (
                method.to_ascii_uppercase(),
                path.trim_start_matches('/').to_string(),
            ),
            canned,
        );
    }
}

impl Drop for MockSnappr {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    state: &Mutex<State>,
    prefix: &str,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response {
    let full_path = uri.path().trim_start_matches('/');
    let path = if prefix.is_empty() {
        full_path.to_string()
    } else {
        match full_path.strip_prefix(prefix) {
            Some(rest) => rest.trim_start_matches('/').to_string(),
            None => return not_found(),
        }
    };

    let recorded = RecordedRequest {
        method: method.as_str().to_string(),
        path: path.clone(),
        query: parse_query(uri.query().unwrap_or_default()),
        headers: headers
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect(),
        body: serde_json::from_slice(body).ok(),
    };

    let key = (recorded.method.clone(), path);
    let canned = {
        let mut guard = state.lock();
        guard.requests.push(recorded.clone());
        let canned = guard.overrides.get(&key).cloned();
        canned
    };

    match canned {
        Some(Canned::Json(status, body)) => return (status, axum::Json(body)).into_response(),
        Some(Canned::Raw(status, content_type, bytes)) => {
            return (status, [(header::CONTENT_TYPE, content_type)], bytes).into_response();
        }
        Some(Canned::Delay(d)) => tokio::time::sleep(d).await,
        None => {}
    }

    let mut guard = state.lock();
    let expected = format!("Bearer {}", guard.api_key);
    if recorded.header("authorization") != Some(expected.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({"error": "unauthorized", "message": "Invalid API key"})),
        )
            .into_response();
    }

    route(&mut guard, &recorded)
}

fn route(state: &mut State, req: &RecordedRequest) -> Response {
    let segments: Vec<&str> = req.path.split('/').filter(|s| !s.is_empty()).collect();
    match (req.method.as_str(), segments.as_slice()) {
        ("GET", ["shoottypes"]) => ok(json!([
            {"name": "headshots", "display_name": "Headshots"},
            {"name": "food", "display_name": "Food"},
            {"name": "real-estate", "display_name": "Real Estate"},
        ])),
        ("GET", ["editing-job-types"]) => ok(json!([
            {"name": "basic-retouch", "display_name": "Basic Retouch"},
            {"name": "background-removal", "display_name": "Background Removal"},
        ])),
        ("GET", ["coverage"]) => ok(json!({
            "address": req.query_param("address"),
            "shoottype": req.query_param("shoottype"),
            "covered": true,
        })),
        ("GET", ["availability"]) => ok(json!({
            "location": req.query_param("location"),
            "slots": [
                {"start_time": format!("{}T09:00:00Z", req.query_param("date_from").unwrap_or_default())},
                {"start_time": format!("{}T14:00:00Z", req.query_param("date_from").unwrap_or_default())},
            ],
        })),
        ("POST", ["bookings"]) => {
            let id = format!("bk_{:06}", state.bookings.len() + 1);
            let booking = with_fields(req.body.as_ref(), &id, "pending");
            state.bookings.push(booking.clone());
            (StatusCode::CREATED, axum::Json(booking)).into_response()
        }
        ("GET", ["bookings"]) => {
            let offset = parse_usize(req.query_param("offset")).unwrap_or(0);
            let limit = parse_usize(req.query_param("limit")).unwrap_or(usize::MAX);
            let status = req.query_param("status");
            let results: Vec<Value> = state
                .bookings
                .iter()
                .filter(|b| status.is_none_or(|s| b["status"] == s))
                .skip(offset)
                .take(limit)
                .cloned()
                .collect();
            ok(json!({"results": results, "count": results.len()}))
        }
        ("GET", ["bookings", id]) => find_booking(state, id).map_or_else(not_found, ok),
        ("GET", ["bookings", id, "media"]) => {
            if find_booking(state, id).is_none() {
                return not_found();
            }
            let all = [
                json!({"type": "photos", "url": format!("https://media.example.com/{id}/1.jpg")}),
                json!({"type": "videos", "url": format!("https://media.example.com/{id}/1.mp4")}),
            ];
            let media: Vec<Value> = all
                .into_iter()
                .filter(|m| req.query_param("type").is_none_or(|t| m["type"] == t))
                .collect();
            ok(json!({"booking_id": id, "media": media}))
        }
        ("POST", ["editing-jobs"]) => {
            let id = format!("ej_{:06}", state.editing_jobs.len() + 1);
            let job = with_fields(req.body.as_ref(), &id, "queued");
            state.editing_jobs.push(job.clone());
            (StatusCode::CREATED, axum::Json(job)).into_response()
        }
        _ => not_found(),
    }
}

fn find_booking(state: &State, id: &str) -> Option<Value> {
    state.bookings.iter().find(|b| b["id"] == id).cloned()
}

fn with_fields(body: Option<&Value>, id: &str, status: &str) -> Value {
    let mut obj = body.and_then(Value::as_object).cloned().unwrap_or_else(Map::new);
    obj.insert("id".to_string(), json!(id));
    obj.insert("status".to_string(), json!(status));
    Value::Object(obj)
}

fn parse_usize(v: Option<&str>) -> Option<usize> {
    v.and_then(|s| s.parse().ok())
}

fn ok(body: Value) -> Response {
    (StatusCode::OK, axum::Json(body)).into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({"error": "not_found", "message": "Resource not found"})),
    )
        .into_response()
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect()
}
