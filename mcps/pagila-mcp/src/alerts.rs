//! Security alert sink
//!
//! Append-only forensic trail of rejected queries and database errors.
//! One line per event:
//!
//! ```text
//! [2026-01-01 12:00:00] [BLOCKED] Reason: <reason> | Query: <query>
//! ```
//!
//! Reason and query are written verbatim except for backslashes and line
//! breaks, which are escaped as `\\`, `\r` and `\n` so that every event stays
//! on one line and the original text can be recovered.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Timestamp format used in alert lines
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only security alert log
#[derive(Debug)]
pub struct AlertSink {
    path: PathBuf,
    // Serializes appends from concurrent tool calls so lines never interleave
    write_lock: Mutex<()>,
}

impl AlertSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a security event
    ///
    /// Never fails: a write error is reported through tracing so the caller
    /// still gets its rejection or database error back.
    pub async fn record(&self, reason: &str, query: &str) {
        tracing::warn!(reason, query, "Security alert");

        let line = format_alert(&Local::now(), reason, query);
        if let Err(e) = self.append(&line).await {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "Failed to write security alert"
            );
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

/// Build one newline-terminated alert line
///
/// Backslashes and line breaks are escaped so a single event is always a
/// single line.
pub fn format_alert(timestamp: &DateTime<Local>, reason: &str, query: &str) -> String {
    format!(
        "[{}] [BLOCKED] Reason: {} | Query: {}\n",
        timestamp.format(TIMESTAMP_FORMAT),
        single_line(reason),
        single_line(query)
    )
}

fn single_line(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}
