//! HTTP semantics for Snappr-backed tools.
//!
//! The Snappr tools only ever issue `GET` lookups or `POST` creations. Tool annotations follow
//! RFC 9110-style method semantics so agents can tell lookups from mutations.

use rmcp::model::ToolAnnotations;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    #[must_use]
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }

    /// MCP tool annotations for a tool backed by this method.
    ///
    /// `openWorldHint` is always `true`: every tool talks to the Snappr API.
    #[must_use]
    pub fn annotations(self) -> ToolAnnotations {
        match self {
            Self::Get => ToolAnnotations {
                title: None,
                read_only_hint: Some(true),
                destructive_hint: Some(false),
                idempotent_hint: Some(true),
                open_world_hint: Some(true),
            },
            // Two identical POSTs create two bookings / jobs.
            Self::Post => ToolAnnotations {
                title: None,
                read_only_hint: Some(false),
                destructive_hint: Some(false),
                idempotent_hint: Some(false),
                open_world_hint: Some(true),
            },
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
