//! Search result types

use crate::catalog::{SearchMode, TableRef};
use crate::connection::ResultRow;
use crate::stats::TransactionSummary;
use serde::Serialize;

/// Why a group is in the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Primary,
    Complementary,
}

/// Rows from one source table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultGroup {
    pub source: TableRef,
    pub label: String,
    pub role: GroupRole,
    pub rows: Vec<ResultRow>,
}

impl ResultGroup {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Result of one search submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub mode: SearchMode,
    pub groups: Vec<ResultGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<TransactionSummary>,
}

impl SearchResult {
    /// "Not found": no group returned a row
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(ResultGroup::is_empty)
    }

    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    /// First group read from `table` with the given role
    pub fn group(&self, table: TableRef, role: GroupRole) -> Option<&ResultGroup> {
        self.groups
            .iter()
            .find(|g| g.source == table && g.role == role)
    }
}
