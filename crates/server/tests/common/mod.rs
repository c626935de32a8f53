#![allow(dead_code)]

use anyhow::Context as _;
use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

pub const API_KEY: &str = "sk_test_integration";

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(15);

/// A `snappr-mcp` command with a scrubbed Snappr/logging environment.
pub fn server_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_snappr-mcp"));
    for var in [
        "SNAPPR_API_KEY",
        "SNAPPR_BASE_URL",
        "SNAPPR_USE_SANDBOX",
        "SNAPPR_TIMEOUT_SECS",
        "SNAPPR_LOG_LEVEL",
        "SNAPPR_LOG_FORMAT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.kill_on_drop(true);
    cmd
}

/// Minimal MCP client speaking newline-delimited JSON-RPC to a spawned `snappr-mcp`.
///
/// Test-only: production code never implements the client side of MCP.
pub struct McpStdioSession {
    _child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
}

impl McpStdioSession {
    /// Spawn the server against `base_url` and complete the MCP initialize handshake.
    pub async fn connect(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut child = server_command()
            .env("SNAPPR_API_KEY", api_key)
            .env("SNAPPR_BASE_URL", base_url)
            .env("SNAPPR_TIMEOUT_SECS", "5")
            .env("SNAPPR_LOG_LEVEL", "debug")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .context("spawn snappr-mcp")?;

        let stdin = child.stdin.take().context("missing child stdin")?;
        let stdout = child.stdout.take().context("missing child stdout")?;

        let mut session = Self {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
        };

        let init = session
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "snappr-mcp-integration-tests", "version": "0" }
                }),
            )
            .await?;
        anyhow::ensure!(
            init.pointer("/result/serverInfo/name") == Some(&json!("snappr-api")),
            "unexpected initialize response: {init}"
        );

        session
            .send(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await?;
        Ok(session)
    }

    async fn send(&mut self, msg: &Value) -> anyhow::Result<()> {
        let mut line = serde_json::to_vec(msg)?;
        line.push(b'\n');
        self.stdin.write_all(&line).await.context("write to server stdin")?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Send a request and return the full JSON-RPC response message with the matching id.
    pub async fn request(&mut self, method: &str, params: Value) -> anyhow::Result<Value> {
        self.next_id += 1;
        let id = self.next_id;
        self.send(&json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await?;

        tokio::time::timeout(RESPONSE_TIMEOUT, async {
            loop {
                let line = self
                    .stdout
                    .next_line()
                    .await?
                    .context("server closed stdout")?;
                if line.trim().is_empty() {
                    continue;
                }
                let msg: Value = serde_json::from_str(&line)
                    .with_context(|| format!("non-JSON line on stdout: {line}"))?;
                if msg.get("id") == Some(&json!(id)) {
                    return anyhow::Ok(msg);
                }
            }
        })
        .await
        .with_context(|| format!("timed out waiting for response to {method}"))?
    }

    pub async fn list_tools(&mut self) -> anyhow::Result<Vec<Value>> {
        let msg = self.request("tools/list", json!({})).await?;
        msg.pointer("/result/tools")
            .and_then(Value::as_array)
            .cloned()
            .with_context(|| format!("tools/list missing result.tools: {msg}"))
    }

    /// Call a tool and return its `CallToolResult` (the JSON-RPC `result`).
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> anyhow::Result<Value> {
        let msg = self
            .request("tools/call", json!({"name": name, "arguments": arguments}))
            .await?;
        msg.get("result")
            .cloned()
            .with_context(|| format!("tools/call {name} returned no result: {msg}"))
    }
}

pub fn is_error(result: &Value) -> bool {
    result.get("isError") == Some(&json!(true))
}

/// The upstream body of a successful call (`structuredContent.body`).
pub fn body(result: &Value) -> &Value {
    result.pointer("/structuredContent/body").unwrap_or(&Value::Null)
}
