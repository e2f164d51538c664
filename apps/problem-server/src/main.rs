//! Coding-problem tool server.
//!
//! Speaks MCP over stdin/stdout and is spawned by the interview API once per dialogue
//! turn. Logs go to stderr because stdout carries the protocol.

mod problems;
mod server;

use anyhow::Result;
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::server::ProblemServer;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("problem_server=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("problem-server v{} ready on stdio", env!("CARGO_PKG_VERSION"));

    let service = ProblemServer::new().serve(stdio()).await?;
    let reason = service.waiting().await?;

    info!("Session ended: {reason:?}");
    Ok(())
}
