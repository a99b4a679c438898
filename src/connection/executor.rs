//! Query execution seam
//!
//! Search and statistics only ever talk to a [`QueryExecutor`]. A live
//! [`Session`](super::Session) is the real implementation; [`FakeExecutor`]
//! returns canned rows and records what it was asked to run.

use super::row::ResultRow;
use rusqlite::types::Value;
use std::cell::{Cell, RefCell};

/// Runs one parameterized, read-only statement and returns its rows.
pub trait QueryExecutor {
    fn fetch(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<ResultRow>>;
}

/// Canned executor for tests
///
/// Returns the same rows for every statement, unless the statement contains
/// the configured failure fragment.
#[derive(Debug, Default)]
pub struct FakeExecutor {
    rows: Vec<ResultRow>,
    fail_on: Option<String>,
    calls: Cell<usize>,
    statements: RefCell<Vec<String>>,
}

impl FakeExecutor {
    /// Executor that returns no rows
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<ResultRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Fail every statement whose text contains `fragment`
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on = Some(fragment.to_string());
        self
    }

    /// Number of statements received (including failed ones)
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.borrow().clone()
    }
}

impl QueryExecutor for FakeExecutor {
    fn fetch(&self, sql: &str, _params: &[Value]) -> rusqlite::Result<Vec<ResultRow>> {
        self.calls.set(self.calls.get() + 1);
        self.statements.borrow_mut().push(sql.to_string());
        match &self.fail_on {
            Some(fragment) if sql.contains(fragment.as_str()) => Err(rusqlite::Error::InvalidQuery),
            _ => Ok(self.rows.clone()),
        }
    }
}
