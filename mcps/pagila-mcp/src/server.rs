//! MCP Server implementation for read-only Pagila queries
//!
//! This module defines the MCP server that exposes the database tools.
//! The work itself lives in the handlers module; every tool replies with text.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError,
};

use crate::config::PagilaConfig;
use crate::db::PgConnector;
use crate::handlers::{Operations, Toolbox};
use crate::params::RunSelectQueryParams;

/// The Pagila MCP Server
#[derive(Clone)]
pub struct PagilaMcpServer {
    ops: Arc<dyn Toolbox>,
    tool_router: ToolRouter<Self>,
}

fn text(reply: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(reply)])
}

// ============================================================================
// Tool Router - Each tool delegates to its operation
// ============================================================================

#[tool_router]
impl PagilaMcpServer {
    /// Create a server that opens a PostgreSQL connection per tool call
    ///
    /// No connection is made here; the credentials are first used by the
    /// first tool call.
    pub fn new(config: &PagilaConfig) -> Self {
        let connector = PgConnector::new(&config.database, config.timeouts.connect());
        Self::with_toolbox(Arc::new(Operations::new(config, connector)))
    }

    /// Create a server over any tool implementation
    pub fn with_toolbox(ops: Arc<dyn Toolbox>) -> Self {
        Self {
            ops,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List all tables available in the public schema of the Pagila database.")]
    async fn list_tables(&self) -> Result<CallToolResult, McpError> {
        tracing::debug!("list_tables");
        Ok(text(self.ops.list_tables().await))
    }

    #[tool(description = "Run a read-only SQL SELECT query on the Pagila database and return the rows as a text table. Non-SELECT statements, write keywords and stacked statements are refused and logged.")]
    async fn run_select_query(
        &self,
        Parameters(params): Parameters<RunSelectQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(query = %params.query, "run_select_query");
        Ok(text(self.ops.run_select_query(&params.query).await))
    }

    #[tool(description = "List customers with an avatar showing their loyalty tier based on total spend.")]
    async fn list_creative_customers(&self) -> Result<CallToolResult, McpError> {
        tracing::debug!("list_creative_customers");
        Ok(text(self.ops.list_creative_customers().await))
    }

    #[tool(description = "Analyst agent that finds the three least rented film categories and suggests a marketing strategy.")]
    async fn business_advisor_agent(&self) -> Result<CallToolResult, McpError> {
        tracing::debug!("business_advisor_agent");
        Ok(text(self.ops.business_advisor_agent().await))
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for PagilaMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Read-only MCP server for the Pagila PostgreSQL database. \
                 Use list_tables to discover tables and run_select_query for ad-hoc SELECT queries. \
                 Queries are checked before they run and execute in a read-only session; \
                 refused queries and database errors are written to a security log."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
