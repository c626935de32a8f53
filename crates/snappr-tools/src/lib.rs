//! Snappr API tool registry + dispatch runtime for the Snappr MCP server.
//!
//! The crate maps MCP tool calls onto single Snappr API requests:
//! - `config`: environment-derived, immutable process configuration
//! - `client`: authenticated HTTP client wrapper around the Snappr API
//! - `schema` / `catalog`: declarative tool descriptors (the nine Snappr tools)
//! - `validate`: the shared argument validation routine
//! - `summary`: per-tool text summaries of successful results
//! - `runtime`: the dispatch gateway producing MCP `CallToolResult`s
//!
//! It intentionally contains **no** MCP transport logic; the server crate owns that.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod runtime;
pub mod safety;
pub mod schema;
pub mod semantics;
pub mod summary;
pub mod validate;

pub use client::{SnapprClient, UpstreamResponse};
pub use config::{ApiKey, SnapprConfig};
pub use error::{Result, SnapprError};
pub use runtime::SnapprGateway;
