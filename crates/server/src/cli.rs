use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Credentials and the base URL come from the environment only (`SNAPPR_API_KEY`,
/// `SNAPPR_BASE_URL`); the flags below are operational knobs.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "snappr-mcp",
    version,
    about = "MCP server exposing the Snappr photography API over stdio"
)]
pub struct Cli {
    /// Per-request timeout for Snappr API calls, in seconds (0 disables the timeout).
    #[arg(long, env = "SNAPPR_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log filter (e.g. `info`, `snappr_mcp_tools=debug`). `RUST_LOG` takes precedence.
    #[arg(long, env = "SNAPPR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "SNAPPR_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
