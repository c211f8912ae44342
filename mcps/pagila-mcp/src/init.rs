//! Process startup: logging and command line
//!
//! Logs go to stderr because stdout carries the MCP protocol.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::PagilaConfig;

/// Initialize tracing for the server
///
/// `RUST_LOG` filters as usual on top of a default `info` level for this
/// crate. Set `LOG_FORMAT=json` for structured output.
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if use_json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer.with_ansi(false)).init();
    }

    Ok(())
}

/// Command line for the Pagila MCP server
///
/// Every database flag falls back to the matching `DB_*` environment
/// variable, which may also come from a `.env` file.
#[derive(Debug, Parser)]
#[command(name = "pagila-mcp")]
#[command(about = "Read-only MCP server for the Pagila PostgreSQL database")]
pub struct Cli {
    /// Config file (default: ~/.binks/pagila.toml if present)
    #[arg(long, env = "PAGILA_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Database host
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,

    /// Database user
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Security alert log file
    #[arg(long, env = "PAGILA_ALERT_LOG")]
    pub alert_log: Option<PathBuf>,
}

impl Cli {
    /// Override file/default settings with anything given on the command
    /// line or in the environment
    pub fn apply(self, config: &mut PagilaConfig) {
        let db = &mut config.database;
        if let Some(host) = self.db_host {
            db.host = host;
        }
        if let Some(port) = self.db_port {
            db.port = port;
        }
        if let Some(user) = self.db_user {
            db.user = user;
        }
        if let Some(password) = self.db_password {
            db.password = password;
        }
        if let Some(name) = self.db_name {
            db.name = name;
        }
        if let Some(path) = self.alert_log {
            config.security.alert_log_path = path;
        }
    }
}
