//! `snappr-mcp`: serves the Snappr API as MCP tools over stdio.
//!
//! Reads `SNAPPR_API_KEY` (required) and `SNAPPR_BASE_URL` (optional) from the environment.
//! Logs go to stderr; stdout is reserved for the MCP transport.

use anyhow::Context as _;
use clap::Parser as _;
use rmcp::ServiceExt as _;
use rmcp::transport::stdio;
use snappr_mcp::SnapprMcpServer;
use snappr_mcp::cli::Cli;
use snappr_mcp::logging;
use snappr_mcp_tools::safety::redact_url;
use snappr_mcp_tools::{SnapprConfig, SnapprGateway};
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(&cli.log_level, cli.log_format) {
        eprintln!("snappr-mcp: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "snappr-mcp failed");
            eprintln!("snappr-mcp: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = SnapprConfig::from_env()
        .context("invalid configuration")?
        .with_timeout(cli.timeout());
    let gateway = SnapprGateway::new(&config).context("build tool gateway")?;

    info!(
        base_url = %redact_url(config.base_url()),
        timeout_secs = cli.timeout_secs,
        tools = gateway.list_tools().len(),
        "snappr-mcp starting on stdio"
    );

    let service = SnapprMcpServer::new(gateway)
        .serve(stdio())
        .await
        .context("start MCP stdio service")?;

    tokio::select! {
        res = service.waiting() => {
            let reason = res.context("MCP service task failed")?;
            info!(?reason, "client disconnected");
        }
        () = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    info!("snappr-mcp stopped");
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
