//! Configuration for Pagila MCP Server

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Pagila MCP configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagilaConfig {
    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Query gate and alert log settings
    #[serde(default)]
    pub security: SecurityConfig,

    /// Connect and statement timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Database name
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_name() -> String {
    "pagila".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            name: default_name(),
        }
    }
}

/// Query gate and security alert configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Words that may not appear anywhere in a caller query (case-insensitive)
    #[serde(default = "default_forbidden_keywords")]
    pub forbidden_keywords: Vec<String>,

    /// Append-only security alert log
    #[serde(default = "default_alert_log")]
    pub alert_log_path: PathBuf,
}

fn default_forbidden_keywords() -> Vec<String> {
    ["DROP", "DELETE", "UPDATE", "TRUNCATE", "ALTER", "GRANT", "INSERT"]
        .iter()
        .map(|w| w.to_string())
        .collect()
}

fn default_alert_log() -> PathBuf {
    PathBuf::from("security_alerts.log")
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            forbidden_keywords: default_forbidden_keywords(),
            alert_log_path: default_alert_log(),
        }
    }
}

/// Timeouts in seconds, 0 disables the limit
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_secs: u64,

    #[serde(default = "default_query_timeout")]
    pub query_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_query_timeout() -> u64 {
    30
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_timeout(),
            query_secs: default_query_timeout(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Option<Duration> {
        non_zero(self.connect_secs)
    }

    pub fn query(&self) -> Option<Duration> {
        non_zero(self.query_secs)
    }
}

fn non_zero(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl PagilaConfig {
    /// Load configuration from file
    ///
    /// Looks for config in:
    /// 1. the explicit `path` (from `--config` / `PAGILA_CONFIG_PATH`)
    /// 2. `~/.binks/pagila.toml`, if it exists
    /// 3. built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".binks").join("pagila.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        tracing::info!("Using default configuration");
        Ok(Self::default())
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Reject configs the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let db = &self.database;
        for (field, value) in [("host", &db.host), ("user", &db.user), ("name", &db.name)] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("database.{} must not be empty", field)));
            }
        }

        if self
            .security
            .forbidden_keywords
            .iter()
            .any(|w| w.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "security.forbidden_keywords must not contain blank entries".to_string(),
            ));
        }

        Ok(())
    }
}
