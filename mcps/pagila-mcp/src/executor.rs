//! Safe query executor
//!
//! Runs statements inside a session that has been forced read-only, with an
//! optional per-statement time limit, and renders result sets as text.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::alerts::AlertSink;
use crate::db::Session;
use crate::gate::AllowedQuery;
use crate::types::{QueryResult, ToolError, ToolResult};

/// Session directive issued before any query runs
pub const READ_ONLY_DIRECTIVE: &str = "SET SESSION CHARACTERISTICS AS TRANSACTION READ ONLY";

/// Server-side limit matching the client-side query timeout
///
/// Dropping a timed-out client future leaves the statement running on the
/// backend; `statement_timeout` makes PostgreSQL cancel it as well.
pub fn statement_timeout_directive(limit: Duration) -> String {
    format!("SET statement_timeout = {}", limit.as_millis())
}

/// Message returned when a query produces no rows
pub const NO_RESULTS: &str = "The query returned no results.";

const COLUMN_SEPARATOR: &str = " | ";
const DIVIDER_WIDTH: usize = 50;
const NULL_TEXT: &str = "NULL";

/// Outcome of a caller query that reached the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    NoResults,
    Rows(QueryResult),
}

impl QueryOutcome {
    /// Text returned to the calling agent
    pub fn render(&self) -> String {
        match self {
            QueryOutcome::NoResults => NO_RESULTS.to_string(),
            QueryOutcome::Rows(result) => render_table(result),
        }
    }
}

/// Executes queries under a read-only session
#[derive(Debug)]
pub struct SafeExecutor {
    alerts: Arc<AlertSink>,
    query_timeout: Option<Duration>,
}

impl SafeExecutor {
    pub fn new(alerts: Arc<AlertSink>, query_timeout: Option<Duration>) -> Self {
        Self {
            alerts,
            query_timeout,
        }
    }

    /// Run a gated caller query
    ///
    /// Database errors are written to the alert log before being returned.
    pub async fn execute<S: Session>(
        &self,
        session: &mut S,
        query: &AllowedQuery,
    ) -> ToolResult<QueryOutcome> {
        let result = self.fetch_read_only(session, query.as_str()).await;

        if let Err(ToolError::Database(message)) = &result {
            self.alerts
                .record(&format!("DB ERROR: {}", message), query.as_str())
                .await;
        }

        let result = result?;
        if result.is_empty() {
            Ok(QueryOutcome::NoResults)
        } else {
            Ok(QueryOutcome::Rows(result))
        }
    }

    /// Force the session read-only, then fetch every row of `sql`
    ///
    /// Used directly only for fixed report queries; caller text must go
    /// through [`SafeExecutor::execute`].
    pub async fn fetch_read_only<S: Session>(
        &self,
        session: &mut S,
        sql: &str,
    ) -> ToolResult<QueryResult> {
        self.limited(session.execute(READ_ONLY_DIRECTIVE)).await?;
        if let Some(limit) = self.query_timeout {
            self.limited(session.execute(&statement_timeout_directive(limit)))
                .await?;
        }
        self.limited(session.fetch_all(sql)).await
    }

    async fn limited<T>(&self, fut: impl Future<Output = ToolResult<T>>) -> ToolResult<T> {
        match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                ToolError::Database(format!(
                    "canceling statement due to timeout after {}s",
                    limit.as_secs()
                ))
            })?,
            None => fut.await,
        }
    }
}

/// Render a result set as a header, a divider and one line per row
pub fn render_table(result: &QueryResult) -> String {
    let mut text = format!("Results ({} rows):\n", result.row_count());
    text.push_str(&result.columns.join(COLUMN_SEPARATOR));
    text.push('\n');
    text.push_str(&"-".repeat(DIVIDER_WIDTH));
    text.push('\n');

    for row in &result.rows {
        let values: Vec<&str> = row
            .iter()
            .map(|v| v.as_deref().unwrap_or(NULL_TEXT))
            .collect();
        text.push_str(&values.join(COLUMN_SEPARATOR));
        text.push('\n');
    }

    text
}
