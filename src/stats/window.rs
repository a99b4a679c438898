//! Time windows for statistics
//!
//! Timestamps are naive local time, matching how `DATAHORA` is stored.

use crate::errors::{Error, Result};
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use serde::Serialize;

/// Format used when binding timestamps (accepted by `julianday`)
pub const SQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Format of a minute bucket key, as produced by `strftime('%Y-%m-%d %H:%M', ...)`
pub const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Longest window accepted; bounds the zero-filled bucket count
pub const MAX_WINDOW_HOURS: u32 = 7 * 24;

/// A window as requested, before it is pinned to a clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowSpec {
    LastHours(u32),
    Between(NaiveDateTime, NaiveDateTime),
}

impl WindowSpec {
    /// Pin the window to `now`.
    pub fn resolve(&self, now: NaiveDateTime) -> Result<TimeWindow> {
        match *self {
            WindowSpec::LastHours(0) => {
                Err(Error::validation("hours", "must be greater than 0"))
            }
            WindowSpec::LastHours(hours) if hours > MAX_WINDOW_HOURS => Err(Error::validation(
                "hours",
                format!("must be at most {MAX_WINDOW_HOURS}, got {hours}"),
            )),
            WindowSpec::LastHours(hours) => {
                let start = now
                    .checked_sub_signed(Duration::hours(i64::from(hours)))
                    .ok_or_else(|| Error::validation("hours", "window start out of range"))?;
                TimeWindow::new(start, now)
            }
            WindowSpec::Between(start, end) => TimeWindow::new(start, end),
        }
    }

    /// Pin the window to the local wall clock.
    pub fn resolve_now(&self) -> Result<TimeWindow> {
        self.resolve(local_now())
    }
}

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Half-open interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start >= end {
            return Err(Error::validation(
                "window",
                format!("start {start} must be before end {end}"),
            ));
        }
        if end - start > Duration::hours(i64::from(MAX_WINDOW_HOURS)) {
            return Err(Error::validation(
                "window",
                format!("must span at most {MAX_WINDOW_HOURS} hours"),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// `?1`/`?2` parameters for the window bounds
    pub(crate) fn bounds(&self) -> [rusqlite::types::Value; 2] {
        [
            rusqlite::types::Value::Text(to_sql_timestamp(self.start)),
            rusqlite::types::Value::Text(to_sql_timestamp(self.end)),
        ]
    }

    /// Every minute overlapping the window, starting at the minute holding `start`.
    pub fn minutes(&self) -> Vec<NaiveDateTime> {
        let mut minute = truncate_to_minute(self.start);
        let mut minutes = Vec::new();
        while minute < self.end {
            minutes.push(minute);
            minute += Duration::minutes(1);
        }
        minutes
    }
}

pub fn to_sql_timestamp(ts: NaiveDateTime) -> String {
    ts.format(SQL_TIMESTAMP_FORMAT).to_string()
}

pub fn minute_key(minute: NaiveDateTime) -> String {
    minute.format(MINUTE_FORMAT).to_string()
}

fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
