//! Scripted in-memory connector for tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Connector, Session};
use crate::types::{QueryResult, ToolError, ToolResult};

/// What every `fetch_all` on a mock session returns
#[derive(Debug, Clone)]
pub(crate) enum Script {
    Rows(QueryResult),
    Fail(ToolError),
}

impl Script {
    pub fn rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        Script::Rows(QueryResult::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| Some(v.to_string())).collect())
                .collect(),
        ))
    }

    pub fn empty() -> Self {
        Script::Rows(QueryResult::default())
    }

    pub fn database_error(message: &str) -> Self {
        Script::Fail(ToolError::Database(message.to_string()))
    }
}

#[derive(Debug)]
struct MockState {
    script: Script,
    unreachable: bool,
    fail_execute: bool,
    fail_close: bool,
    opened: AtomicUsize,
    closed: AtomicUsize,
    statements: Mutex<Vec<String>>,
}

/// Connector double that counts sessions and records every statement
#[derive(Debug, Clone)]
pub(crate) struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    pub fn new(script: Script) -> Self {
        Self::build(script, false, false, false)
    }

    pub fn unreachable() -> Self {
        Self::build(Script::empty(), true, false, false)
    }

    pub fn failing_execute(self) -> Self {
        let s = &self.state;
        Self::build(s.script.clone(), s.unreachable, true, s.fail_close)
    }

    pub fn failing_close(self) -> Self {
        let s = &self.state;
        Self::build(s.script.clone(), s.unreachable, s.fail_execute, true)
    }

    fn build(script: Script, unreachable: bool, fail_execute: bool, fail_close: bool) -> Self {
        Self {
            state: Arc::new(MockState {
                script,
                unreachable,
                fail_execute,
                fail_close,
                opened: AtomicUsize::new(0),
                closed: AtomicUsize::new(0),
                statements: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.state.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Session = MockSession;

    async fn open(&self) -> ToolResult<MockSession> {
        if self.state.unreachable {
            return Err(ToolError::Connection("connection refused".to_string()));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            state: Arc::clone(&self.state),
        })
    }
}

pub(crate) struct MockSession {
    state: Arc<MockState>,
}

impl MockSession {
    fn log(&self, sql: &str) {
        self.state.statements.lock().unwrap().push(sql.to_string());
    }
}

#[async_trait]
impl Session for MockSession {
    async fn execute(&mut self, sql: &str) -> ToolResult<()> {
        self.log(sql);
        if self.state.fail_execute {
            return Err(ToolError::Database("cannot set transaction mode".to_string()));
        }
        Ok(())
    }

    async fn fetch_all(&mut self, sql: &str) -> ToolResult<QueryResult> {
        self.log(sql);
        match &self.state.script {
            Script::Rows(result) => Ok(result.clone()),
            Script::Fail(err) => Err(err.clone()),
        }
    }

    async fn close(self) -> ToolResult<()> {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_close {
            return Err(ToolError::System("socket already closed".to_string()));
        }
        Ok(())
    }
}
