//! Dispatch gateway: tool call → validated arguments → one Snappr request → `CallToolResult`.

use crate::catalog::snappr_tools;
use crate::client::{SnapprClient, UpstreamResponse};
use crate::config::SnapprConfig;
use crate::error::{Result, SnapprError};
use crate::schema::{ParamLocation, RegisteredTool, ToolDescriptor, ToolRegistry};
use crate::validate::{ValidatedArguments, ValidationFailure, Violation, validate_arguments};
use base64::Engine as _;
use rmcp::model::{CallToolResult, Content, Tool};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// An upstream request, fully resolved from validated tool arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParts {
    /// Percent-encoded path relative to the base URL.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Clone)]
pub struct SnapprGateway {
    inner: Arc<SnapprGatewayInner>,
}

struct SnapprGatewayInner {
    client: SnapprClient,
    registry: ToolRegistry,
}

impl SnapprGateway {
    /// Build the gateway serving the nine Snappr tools.
    ///
    /// The resulting instance is immutable and safe to share across tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or the tool registry cannot be built.
    pub fn new(config: &SnapprConfig) -> Result<Self> {
        let client = SnapprClient::new(config)?;
        let registry = ToolRegistry::new(snappr_tools())?;
        Ok(Self::with_registry(client, registry))
    }

    #[must_use]
    pub fn with_registry(client: SnapprClient, registry: ToolRegistry) -> Self {
        Self {
            inner: Arc::new(SnapprGatewayInner { client, registry }),
        }
    }

    /// List the MCP `Tool`s exposed by this gateway.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.inner.registry.iter().map(|t| t.tool.clone()).collect()
    }

    /// Validate, build and send the upstream request for one tool call.
    ///
    /// # Errors
    ///
    /// Returns the typed failure: unknown tool, validation, upstream (non-2xx) or transport.
    pub async fn dispatch(&self, tool_name: &str, arguments: &Value) -> Result<UpstreamResponse> {
        let tool = self
            .inner
            .registry
            .get(tool_name)
            .ok_or_else(|| SnapprError::UnknownTool(tool_name.to_string()))?;

        let args = validate_arguments(tool, arguments)?;
        let parts = build_request_parts(&tool.descriptor, &args)?;

        self.inner
            .client
            .request(
                tool.descriptor.method,
                &parts.path,
                &parts.query,
                parts.body.as_ref(),
            )
            .await
    }

    /// Execute a tool call and shape the outcome into an MCP tool result.
    ///
    /// Validation, upstream and transport failures are reported as `isError` tool results, never
    /// as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapprError::UnknownTool`] if `tool_name` is not registered.
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<CallToolResult> {
        let Some(tool) = self.inner.registry.get(tool_name) else {
            return Err(SnapprError::UnknownTool(tool_name.to_string()));
        };

        let started = Instant::now();
        let outcome = self.dispatch(tool_name, &arguments).await;
        let elapsed_ms = started.elapsed().as_millis();

        match outcome {
            Ok(resp) => {
                info!(tool = %tool_name, elapsed_ms, "tool call succeeded");
                Ok(success_result(&tool.descriptor, &arguments, resp))
            }
            Err(e) => {
                warn!(
                    tool = %tool_name,
                    kind = e.kind(),
                    status = e.status(),
                    elapsed_ms,
                    error = %e,
                    "tool call failed"
                );
                Ok(error_result(&e))
            }
        }
    }
}

fn registered_tool_names(registry: &ToolRegistry) -> Vec<&'static str> {
    registry.iter().map(|t: &RegisteredTool| t.descriptor.name).collect()
}

impl std::fmt::Debug for SnapprGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapprGateway")
            .field("client", &self.inner.client)
            .field("tools", &registered_tool_names(&self.inner.registry))
            .finish()
    }
}

/// Place validated arguments on the upstream request (path, query string or JSON body).
///
/// # Errors
///
/// Returns a validation error if a path argument would escape its path segment.
pub fn build_request_parts(
    tool: &ToolDescriptor,
    args: &ValidatedArguments,
) -> Result<RequestParts> {
    let mut path = tool.path.to_string();
    let mut query: Vec<(String, String)> = Vec::new();
    let mut body: Option<Map<String, Value>> = None;

    for param in &tool.params {
        let Some(value) = args.get(param.name).cloned().or_else(|| param.default.clone()) else {
            continue;
        };
        if param.omit_when.is_some_and(|skip| value.as_str() == Some(skip)) {
            continue;
        }

        match param.location {
            ParamLocation::Path => {
                let segment = value_to_string(&value);
                if segment.is_empty() || segment == "." || segment == ".." {
                    return Err(SnapprError::Validation(ValidationFailure {
                        message: format!(
                            "Invalid params: '{}' is not a valid identifier",
                            param.name
                        ),
                        violations: vec![Violation::ConstraintViolation {
                            message: format!("{segment:?} is not a valid path segment"),
                            instance_path: format!("/{}", param.name),
                        }],
                    }));
                }
                path = path.replace(
                    &format!("{{{}}}", param.upstream_name),
                    &encode_path_segment(&segment),
                );
            }
            ParamLocation::Query => {
                query.push((param.upstream_name.to_string(), value_to_string(&value)));
            }
            ParamLocation::Body => {
                insert_nested(body.get_or_insert_with(Map::new), param.upstream_name, value);
            }
        }
    }

    Ok(RequestParts {
        path,
        query,
        body: body.map(Value::Object),
    })
}

/// Insert `value` at a dotted field path (`contact.name`), creating intermediate objects.
fn insert_nested(body: &mut Map<String, Value>, dotted: &str, value: Value) {
    match dotted.split_once('.') {
        None => {
            body.insert(dotted.to_string(), value);
        }
        Some((head, rest)) => {
            let child = body
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_nested(map, rest, value);
            }
        }
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

fn encode_path_segment(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

/// JSON bodies are led by the tool's summary, when it has one.
fn success_result(tool: &ToolDescriptor, args: &Value, resp: UpstreamResponse) -> CallToolResult {
    match resp {
        UpstreamResponse::Binary { bytes, mime_type } => {
            let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
            if mime_type.starts_with("image/") {
                return CallToolResult::success(vec![Content::image(b64, mime_type)]);
            }
            let envelope = json!({
                "encoding": "base64",
                "mimeType": mime_type,
                "data": b64,
            });
            structured_result(envelope, false)
        }
        UpstreamResponse::Json(body) => {
            let summary = tool.summarize(args, &body);
            let mut result = structured_result(body, false);
            if let Some(summary) = summary {
                result.content.insert(0, Content::text(summary));
            }
            result
        }
    }
}

fn error_result(err: &SnapprError) -> CallToolResult {
    structured_result(err.to_tool_payload(), true)
}

/// Text content mirrors the structured payload; successes wrap it as `{"body": ...}`.
fn structured_result(payload: Value, is_error: bool) -> CallToolResult {
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    let structured = if is_error {
        payload
    } else {
        json!({ "body": payload })
    };
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(structured),
        is_error: Some(is_error),
        meta: None,
    }
}
