//! Snappr MCP server: CLI, logging and the rmcp `ServerHandler` over the Snappr tool gateway.

pub mod cli;
pub mod logging;
pub mod server;

pub use server::SnapprMcpServer;
