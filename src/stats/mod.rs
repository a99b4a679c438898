//! Statistics aggregator: fixed analytical queries shaped for charting
//!
//! All operations are read-only and idempotent. Windows are resolved by the
//! caller (see [`WindowSpec`]) so results are reproducible for a given clock.

pub mod cache;
pub mod dashboard;
pub mod distribution;
pub mod queries;
pub mod types;
pub mod window;

pub use cache::{CacheStats, StatsCache};
pub use dashboard::{dashboard, Dashboard, DashboardRequest, PanelResult, PerformanceRows};
pub use distribution::percentile;
pub use queries::{
    entries_per_minute, operations_by_function, operations_per_minute, recent_errors,
    transaction_performance, transaction_summary,
};
pub use types::{
    Direction, DurationStats, EntryCount, FunctionCount, FunctionSeries, MinuteBucket,
    OperationsTimeline, PerformanceReport, PerformanceSource, TransactionSummary,
    TransactionTiming,
};
pub use window::{local_now, TimeWindow, WindowSpec};
