//! Pagila MCP - Read-only SQL tools for the Pagila PostgreSQL database
//!
//! Serves the MCP protocol over stdio; logs go to stderr.

use anyhow::Context;
use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};

use pagila_mcp::init::{init_tracing, Cli};
use pagila_mcp::{PagilaConfig, PagilaMcpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply
    dotenv::dotenv().ok();

    init_tracing("pagila_mcp")?;

    let cli = Cli::parse();
    let mut config = PagilaConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    cli.apply(&mut config);
    config.validate()?;

    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        alert_log = %config.security.alert_log_path.display(),
        "Starting pagila_mcp MCP Server"
    );

    let server = PagilaMcpServer::new(&config);
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");

    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
