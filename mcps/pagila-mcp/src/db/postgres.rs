//! PostgreSQL sessions backed by a single `sqlx` connection

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column, ConnectOptions, Connection, Executor, Row};

use super::{Connector, Session};
use crate::config::DatabaseConfig;
use crate::types::{QueryResult, ToolError, ToolResult};

/// Reported to the server as `application_name`
const APPLICATION_NAME: &str = "pagila-mcp";

/// Opens one PostgreSQL connection per call
#[derive(Debug, Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
    connect_timeout: Option<Duration>,
}

impl PgConnector {
    pub fn new(config: &DatabaseConfig, connect_timeout: Option<Duration>) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name)
            .application_name(APPLICATION_NAME)
            .disable_statement_logging();

        Self {
            options,
            connect_timeout,
        }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Session = PgSession;

    async fn open(&self) -> ToolResult<PgSession> {
        let connect = PgConnection::connect_with(&self.options);

        let conn = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect).await.map_err(|_| {
                ToolError::Connection(format!("timed out after {}s", limit.as_secs()))
            })?,
            None => connect.await,
        }
        .map_err(|e| ToolError::Connection(e.to_string()))?;

        tracing::debug!(
            host = self.options.get_host(),
            database = ?self.options.get_database(),
            "Opened database session"
        );
        Ok(PgSession { conn })
    }
}

/// A live PostgreSQL connection owned by one tool call
///
/// Statements go through the simple query protocol, so every column comes
/// back in its text representation whatever its SQL type.
pub struct PgSession {
    conn: PgConnection,
}

#[async_trait]
impl Session for PgSession {
    async fn execute(&mut self, sql: &str) -> ToolResult<()> {
        self.conn.execute(sqlx::raw_sql(sql)).await?;
        Ok(())
    }

    async fn fetch_all(&mut self, sql: &str) -> ToolResult<QueryResult> {
        let rows = self.conn.fetch_all(sqlx::raw_sql(sql)).await?;
        rows_to_result(&rows)
    }

    async fn close(self) -> ToolResult<()> {
        self.conn.close().await?;
        Ok(())
    }
}

fn rows_to_result(rows: &[PgRow]) -> ToolResult<QueryResult> {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|i| row.try_get_unchecked::<Option<String>, _>(i))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(QueryResult::new(columns, rows))
}
