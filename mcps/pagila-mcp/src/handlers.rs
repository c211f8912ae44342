//! Tool operations
//!
//! Each operation opens its own session, does its work and always answers
//! with text: failures are turned into descriptive messages here rather than
//! protocol errors, because the calling agent only reads text.

use std::sync::Arc;

use async_trait::async_trait;

use crate::alerts::AlertSink;
use crate::config::PagilaConfig;
use crate::db::{Connector, Provisioner};
use crate::executor::SafeExecutor;
use crate::gate::{QueryGate, ValidationOutcome};
use crate::reports;
use crate::types::{QueryResult, ToolError, ToolResult};

/// The tool surface, as plain text in and text out
#[async_trait]
pub trait Toolbox: Send + Sync {
    /// Comma separated list of tables in the public schema
    async fn list_tables(&self) -> String;

    /// Gate, then run, a caller-supplied query
    async fn run_select_query(&self, query: &str) -> String;

    /// Customer directory with loyalty tiers
    async fn list_creative_customers(&self) -> String;

    /// Promotion advice for the three least rented categories
    async fn business_advisor_agent(&self) -> String;
}

/// Everything a tool call needs, shared read-only between calls
pub struct Operations<C> {
    gate: QueryGate,
    alerts: Arc<AlertSink>,
    executor: Arc<SafeExecutor>,
    provisioner: Provisioner<C>,
}

impl<C: Connector> Operations<C> {
    pub fn new(config: &PagilaConfig, connector: C) -> Self {
        let alerts = Arc::new(AlertSink::new(&config.security.alert_log_path));
        let executor = Arc::new(SafeExecutor::new(
            Arc::clone(&alerts),
            config.timeouts.query(),
        ));

        Self {
            gate: QueryGate::new(&config.security),
            alerts,
            executor,
            provisioner: Provisioner::new(connector),
        }
    }

    pub fn alerts(&self) -> &AlertSink {
        &self.alerts
    }

    async fn report(&self, sql: &'static str) -> ToolResult<QueryResult> {
        let executor = Arc::clone(&self.executor);
        self.provisioner
            .scoped(move |session| {
                Box::pin(async move { executor.fetch_read_only(session, sql).await })
            })
            .await
    }
}

#[async_trait]
impl<C: Connector> Toolbox for Operations<C> {
    async fn list_tables(&self) -> String {
        self.report(reports::LIST_TABLES_SQL)
            .await
            .map(|r| reports::format_tables(&r))
            .unwrap_or_else(|e| reply_error("list_tables", e))
    }

    async fn run_select_query(&self, query: &str) -> String {
        let allowed = match self.gate.validate(query) {
            ValidationOutcome::Allowed(allowed) => allowed,
            ValidationOutcome::Rejected(rejection) => {
                self.alerts.record(&rejection.alert_reason(), query).await;
                return ToolError::Rejected(rejection).to_string();
            }
        };

        let executor = Arc::clone(&self.executor);
        self.provisioner
            .scoped(move |session| {
                Box::pin(async move { executor.execute(session, &allowed).await })
            })
            .await
            .map(|outcome| outcome.render())
            .unwrap_or_else(|e| reply_error("run_select_query", e))
    }

    async fn list_creative_customers(&self) -> String {
        self.report(reports::CREATIVE_CUSTOMERS_SQL)
            .await
            .map(|r| reports::format_customer_directory(&r))
            .unwrap_or_else(|e| reply_error("list_creative_customers", e))
    }

    async fn business_advisor_agent(&self) -> String {
        self.report(reports::LOW_PERFORMING_CATEGORIES_SQL)
            .await
            .map(|r| reports::format_category_advice(&r))
            .unwrap_or_else(|e| reply_error("business_advisor_agent", e))
    }
}

/// Turn a failure into the text reply, logging the operational ones
fn reply_error(tool: &str, err: ToolError) -> String {
    match &err {
        ToolError::Connection(_) | ToolError::System(_) => {
            tracing::error!(tool, error = %err, "Tool call failed");
        }
        ToolError::Database(_) | ToolError::Rejected(_) => {
            tracing::debug!(tool, error = %err, "Tool call refused");
        }
    }
    err.to_string()
}
