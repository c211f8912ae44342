//! Type definitions for Pagila MCP

use thiserror::Error;

use crate::gate::Rejection;

// ============================================================================
// Result Types
// ============================================================================

/// Fully fetched result set with every value rendered as text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names in query order
    pub columns: Vec<String>,
    /// Rows in fetch order, `None` for SQL NULL
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .map(move |row| idx.and_then(|i| row.get(i)).and_then(|v| v.as_deref()))
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Everything that can go wrong inside a tool call
///
/// The display text is what the calling agent receives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("SECURITY ERROR: {0}")]
    Rejected(Rejection),

    #[error("CONNECTION ERROR: {0}")]
    Connection(String),

    #[error("DATABASE ERROR: {0}")]
    Database(String),

    #[error("SYSTEM ERROR: {0}")]
    System(String),
}

/// Result type alias for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

impl From<sqlx::Error> for ToolError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => ToolError::Database(db.message().to_string()),
            other => ToolError::System(other.to_string()),
        }
    }
}
