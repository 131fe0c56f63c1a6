//! codecks-mcp: MCP server binary for Codecks.
//!
//! Runs over stdio. Configure in an MCP host with:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "codecks": {
//!       "command": "codecks-mcp",
//!       "env": { "CODECKS_SUBDOMAIN": "...", "CODECKS_AUTH_TOKEN": "..." }
//!     }
//!   }
//! }
//! ```

use codecks_mcp::codecks::{CodecksClient, CodecksError, bootstrap};
use codecks_mcp::config::{Config, log_filter};
use codecks_mcp::mcp::CodecksServer;
use miette::Diagnostic;
use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*};

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Codecks(#[from] CodecksError),

    #[error("MCP service error: {0}")]
    #[diagnostic(code(codecks::binary::service))]
    Service(String),
}

/// Log to stderr; stdout carries the MCP protocol.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(log_filter())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), BinaryError> {
    init_tracing();

    let config = Config::load_from(std::env::args_os())?;
    info!(
        subdomain = %config.subdomain,
        api_url = %config.api_url,
        "Starting Codecks MCP server"
    );

    // reqwest is built without a bundled provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let client = CodecksClient::new(&config)?;
    let context = bootstrap(&client).await?;
    let server = CodecksServer::new(client, context);

    info!("Serving on stdio");
    let service = server
        .serve(stdio())
        .await
        .map_err(|e| BinaryError::Service(e.to_string()))?;
    let reason = service
        .waiting()
        .await
        .map_err(|e| BinaryError::Service(e.to_string()))?;

    info!(?reason, "Server shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    if let Err(e) = run().await {
        error!(error = %e, "codecks-mcp exited with an error");
        return Err(e.into());
    }
    Ok(())
}
