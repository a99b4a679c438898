//! Statistics result types

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// What `entries_per_minute` counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryCount {
    /// Every TIXLOG row
    #[default]
    Rows,
    /// Only the first row of each control number inside the window
    NewControlNumbers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinuteBucket {
    pub minute: NaiveDateTime,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCount {
    pub function: String,
    pub count: u64,
}

/// Per-minute counts of one function, aligned with [`OperationsTimeline::minutes`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSeries {
    pub function: String,
    pub counts: Vec<u64>,
}

/// Operations per function per minute, pivoted onto a shared minute axis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationsTimeline {
    pub minutes: Vec<NaiveDateTime>,
    pub series: Vec<FunctionSeries>,
}

impl OperationsTimeline {
    pub fn series_for(&self, function: &str) -> Option<&FunctionSeries> {
        self.series.iter().find(|s| s.function == function)
    }
}

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
    Undefined,
}

impl Direction {
    /// Decode the ranked code computed in SQL (2 = OUT, 1 = IN)
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Direction::Out,
            1 => Direction::In,
            _ => Direction::Undefined,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
            Direction::Undefined => "UNDEFINED",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing of one control number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionTiming {
    pub control_number: String,
    pub direction: Direction,
    pub duration_ms: i64,
    pub steps: u64,
}

/// Duration distribution, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub count: usize,
    pub min_ms: i64,
    pub max_ms: i64,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub transactions: Vec<TransactionTiming>,
    /// Directions without transactions are absent
    pub by_direction: BTreeMap<Direction, DurationStats>,
}

/// Where performance rows come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceSource {
    Window(super::TimeWindow),
    /// The newest N TIXLOG rows by `ID`
    LatestRows(usize),
}

/// Timing summary of a single control number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    pub control_number: String,
    pub direction: Direction,
    pub first_seen: String,
    pub last_seen: String,
    pub duration_ms: i64,
    pub steps: u64,
}
