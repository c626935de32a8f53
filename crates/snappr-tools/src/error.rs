//! Error types for `snappr-mcp-tools`.

use crate::safety::sanitize_reqwest_error;
use crate::validate::ValidationFailure;
use serde_json::{Value, json};
use thiserror::Error;

/// Main error type for Snappr tool dispatch.
#[derive(Debug, Error)]
pub enum SnapprError {
    /// Configuration errors (missing/placeholder API key, invalid base URL, invalid registry).
    #[error("config error: {0}")]
    Config(String),

    /// The tool name is not part of the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments do not match the tool's declared parameters.
    #[error("validation error: {0}")]
    Validation(ValidationFailure),

    /// The Snappr API answered with a non-2xx status. `body` is the upstream body, verbatim.
    #[error("Snappr API returned HTTP {status}: {body}")]
    Upstream { status: u16, body: Value },

    /// Network failure, timeout, or unreadable response body.
    #[error("http transport error: {0}")]
    Transport(String),
}

/// Result type alias for Snappr tool operations.
pub type Result<T> = std::result::Result<T, SnapprError>;

impl From<reqwest::Error> for SnapprError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(sanitize_reqwest_error(&value))
    }
}

impl From<ValidationFailure> for SnapprError {
    fn from(value: ValidationFailure) -> Self {
        Self::Validation(value)
    }
}

impl SnapprError {
    /// Short machine-readable category used in tool error payloads.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::UnknownTool(_) => "unknown_tool",
            Self::Validation(_) => "validation",
            Self::Upstream { .. } => "upstream",
            Self::Transport(_) => "transport",
        }
    }

    /// Upstream HTTP status, when the failure came from a Snappr response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self.status() {
            Some(401) => Some("Snappr rejected the API key; check SNAPPR_API_KEY"),
            Some(403) => Some("the API key is not allowed to perform this operation"),
            Some(404) => Some("resource or endpoint not found"),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(failure) => failure.message.clone(),
            Self::Upstream { body, .. } => match body {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            Self::Config(s) | Self::UnknownTool(s) | Self::Transport(s) => s.clone(),
        }
    }

    /// Structured `{kind, status, message, ...}` payload returned to the calling agent.
    #[must_use]
    pub fn to_tool_payload(&self) -> Value {
        let mut payload = json!({
            "kind": self.kind(),
            "status": self.status(),
            "message": self.message(),
        });
        match self {
            Self::Validation(failure) => {
                payload["details"] = json!({ "violations": failure.violations });
            }
            Self::Upstream { body, .. } if !body.is_string() => {
                payload["details"] = body.clone();
            }
            _ => {}
        }
        if let Some(hint) = self.hint() {
            payload["hint"] = json!(hint);
        }
        payload
    }
}
