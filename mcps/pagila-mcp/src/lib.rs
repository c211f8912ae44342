//! Pagila MCP Library
//!
//! Read-only SQL tools for the Pagila PostgreSQL database.
//! Caller queries pass a text gate, run in a read-only session, and every
//! refused query or database error lands in an append-only security log.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use pagila_mcp::{PagilaConfig, PagilaMcpServer};
//!
//! let server = PagilaMcpServer::new(&PagilaConfig::default());
//! // Serve via stdio or use with an in-memory transport
//! ```

pub mod alerts;
pub mod config;
pub mod db;
pub mod executor;
pub mod gate;
pub mod handlers;
pub mod init;
pub mod params;
pub mod reports;
pub mod server;
pub mod types;

// Re-export main server type
pub use server::PagilaMcpServer;

pub use config::PagilaConfig;
pub use gate::{QueryGate, Rejection, ValidationOutcome};
pub use handlers::{Operations, Toolbox};
pub use params::RunSelectQueryParams;
pub use types::{QueryResult, ToolError};
