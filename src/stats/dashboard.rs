//! Statistics dashboard
//!
//! Runs the four panels one after another. Each panel keeps its own outcome,
//! so a failing query blanks only its own panel.

use super::cache::{CachedPanel, StatsCache};
use super::queries;
use super::types::{EntryCount, FunctionCount, MinuteBucket, PerformanceReport, PerformanceSource};
use super::window::{TimeWindow, WindowSpec};
use crate::config::StatsSettings;
use crate::connection::{QueryExecutor, ResultRow};
use crate::errors::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::warn;

/// Rows feeding the performance panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceRows {
    /// Same window as the other panels
    Window,
    LatestRows(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DashboardRequest {
    pub window: WindowSpec,
    pub entry_count: EntryCount,
    pub error_limit: usize,
    pub performance: PerformanceRows,
}

impl DashboardRequest {
    pub fn from_settings(settings: &StatsSettings) -> Self {
        Self {
            window: WindowSpec::LastHours(settings.window_hours),
            entry_count: EntryCount::Rows,
            error_limit: settings.error_limit,
            performance: PerformanceRows::Window,
        }
    }
}

/// Outcome of one panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum PanelResult<T> {
    Ready(T),
    Failed { message: String },
}

impl<T> PanelResult<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, PanelResult::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PanelResult::Ready(value) => Some(value),
            PanelResult::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub window: TimeWindow,
    pub entries: PanelResult<Vec<MinuteBucket>>,
    pub operations: PanelResult<Vec<FunctionCount>>,
    pub errors: PanelResult<Vec<ResultRow>>,
    pub performance: PanelResult<PerformanceReport>,
}

impl Dashboard {
    pub fn failed_panels(&self) -> usize {
        [
            self.entries.is_ready(),
            self.operations.is_ready(),
            self.errors.is_ready(),
            self.performance.is_ready(),
        ]
        .iter()
        .filter(|ready| !**ready)
        .count()
    }
}

/// Build the dashboard. Only an invalid request fails as a whole.
pub fn dashboard(
    executor: &dyn QueryExecutor,
    request: &DashboardRequest,
    now: NaiveDateTime,
    cache: Option<&StatsCache>,
) -> Result<Dashboard> {
    let window = request.window.resolve(now)?;
    let performance_source = match request.performance {
        PerformanceRows::Window => PerformanceSource::Window(window),
        PerformanceRows::LatestRows(n) => PerformanceSource::LatestRows(n),
    };

    let entries = run_panel(
        "entries_per_minute",
        cache,
        format!("entries|{:?}|{:?}", request.window, request.entry_count),
        || queries::entries_per_minute(executor, &window, request.entry_count),
    );
    let operations = run_panel(
        "operations_by_function",
        cache,
        format!("operations|{:?}", request.window),
        || queries::operations_by_function(executor, &window),
    );
    let errors = run_panel(
        "recent_errors",
        cache,
        format!("errors|{:?}|{}", request.window, request.error_limit),
        || queries::recent_errors(executor, request.error_limit, Some(window.start())),
    );
    let performance = run_panel(
        "transaction_performance",
        cache,
        format!("performance|{:?}|{:?}", request.window, request.performance),
        || queries::transaction_performance(executor, &performance_source),
    );

    Ok(Dashboard {
        window,
        entries,
        operations,
        errors,
        performance,
    })
}

fn run_panel<T, F>(
    panel: &str,
    cache: Option<&StatsCache>,
    key: String,
    load: F,
) -> PanelResult<T>
where
    T: CachedPanel + Clone,
    F: FnOnce() -> Result<T>,
{
    let outcome = match cache {
        Some(cache) => cache.get_or_load(key, load),
        None => load(),
    };
    match outcome {
        Ok(value) => PanelResult::Ready(value),
        Err(e) => {
            warn!(panel, error = %e, "statistics panel failed");
            PanelResult::Failed {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::FakeExecutor;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn request() -> DashboardRequest {
        DashboardRequest {
            window: WindowSpec::LastHours(1),
            entry_count: EntryCount::Rows,
            error_limit: 10,
            performance: PerformanceRows::LatestRows(1000),
        }
    }

    #[test]
    fn test_failing_panel_is_isolated() {
        // Only the errors panel selects CODIGO_CLIENTE explicitly
        let fake = FakeExecutor::new().failing_on("CODIGO_CLIENTE");
        let board = dashboard(&fake, &request(), now(), None).unwrap();

        assert!(board.entries.is_ready());
        assert!(board.operations.is_ready());
        assert!(board.performance.is_ready());
        assert!(matches!(board.errors, PanelResult::Failed { .. }));
        assert_eq!(board.failed_panels(), 1);
        assert_eq!(fake.calls(), 4);
    }

    #[test]
    fn test_invalid_window_fails_before_queries() {
        let fake = FakeExecutor::new();
        let mut bad = request();
        bad.window = WindowSpec::LastHours(0);
        assert!(dashboard(&fake, &bad, now(), None).is_err());
        assert_eq!(fake.calls(), 0);
    }

    #[test]
    fn test_cache_serves_repeat_requests() {
        let fake = FakeExecutor::new();
        let cache = StatsCache::new(Duration::from_secs(60));

        dashboard(&fake, &request(), now(), Some(&cache)).unwrap();
        dashboard(&fake, &request(), now(), Some(&cache)).unwrap();

        assert_eq!(fake.calls(), 4);
        assert_eq!(cache.stats().hits, 4);
    }

    #[test]
    fn test_panel_serializes_with_status() {
        let failed: PanelResult<Vec<u64>> = PanelResult::Failed {
            message: "boom".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["data"]["message"], "boom");
    }
}
