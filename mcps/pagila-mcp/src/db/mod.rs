//! Database session layer
//!
//! Each tool call opens exactly one session through a [`Connector`] and the
//! [`Provisioner`] closes it again before the call returns, whatever the
//! outcome. Sessions are never pooled or shared between calls.

pub mod postgres;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::types::{QueryResult, ToolResult};

pub use postgres::{PgConnector, PgSession};

/// One live, exclusively owned database session
#[async_trait]
pub trait Session: Send {
    /// Run a statement that returns no rows
    async fn execute(&mut self, sql: &str) -> ToolResult<()>;

    /// Run a query and fetch the whole result set
    async fn fetch_all(&mut self, sql: &str) -> ToolResult<QueryResult>;

    /// Close the session; consumes it so it cannot be closed twice
    async fn close(self) -> ToolResult<()>;
}

/// Opens fresh sessions
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: Session;

    /// Fails with [`ToolError::Connection`](crate::types::ToolError::Connection)
    /// when the database is unreachable or rejects the credentials
    async fn open(&self) -> ToolResult<Self::Session>;
}

/// Scoped session acquisition
pub struct Provisioner<C> {
    connector: C,
}

impl<C: Connector> Provisioner<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Open a session, run `body` with it, then close it
    ///
    /// The session is closed on every path out of `body`, including errors.
    /// A failed close is logged and does not replace the body's outcome.
    pub async fn scoped<T, F>(&self, body: F) -> ToolResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s mut C::Session) -> BoxFuture<'s, ToolResult<T>> + Send,
    {
        let mut session = self.connector.open().await?;
        let outcome = body(&mut session).await;

        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close database session cleanly");
        }

        outcome
    }
}
