//! Statistics queries
//!
//! Every panel is one read-only statement; shaping (zero-filling, pivoting,
//! distributions) happens here rather than in SQL.

use super::types::{
    Direction, EntryCount, FunctionCount, FunctionSeries, MinuteBucket, OperationsTimeline,
    PerformanceReport, PerformanceSource, TransactionSummary, TransactionTiming,
};
use super::window::{minute_key, to_sql_timestamp, TimeWindow};
use super::DurationStats;
use crate::connection::{QueryExecutor, ResultRow};
use crate::errors::{Error, Result};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const ENTRIES_PER_MINUTE_SQL: &str = "\
    SELECT strftime('%Y-%m-%d %H:%M', DATAHORA) AS MINUTE, COUNT(*) AS TOTAL \
    FROM indigo_pix.TIXLOG \
    WHERE julianday(DATAHORA) >= julianday(?1) AND julianday(DATAHORA) < julianday(?2) \
    GROUP BY MINUTE \
    ORDER BY MINUTE";

const NEW_CONTROL_NUMBERS_PER_MINUTE_SQL: &str = "\
    WITH FIRST_SEEN AS ( \
        SELECT DATAHORA, \
               ROW_NUMBER() OVER (PARTITION BY NR_CONTROLE ORDER BY julianday(DATAHORA), ID) AS RN \
        FROM indigo_pix.TIXLOG \
        WHERE julianday(DATAHORA) >= julianday(?1) AND julianday(DATAHORA) < julianday(?2) \
    ) \
    SELECT strftime('%Y-%m-%d %H:%M', DATAHORA) AS MINUTE, COUNT(*) AS TOTAL \
    FROM FIRST_SEEN \
    WHERE RN = 1 \
    GROUP BY MINUTE \
    ORDER BY MINUTE";

const OPERATIONS_BY_FUNCTION_SQL: &str = "\
    SELECT COALESCE(FUNCAO, '(unknown)') AS NAME, COUNT(*) AS TOTAL \
    FROM indigo_cad.MCLOG \
    WHERE julianday(DATAHORA) >= julianday(?1) AND julianday(DATAHORA) < julianday(?2) \
    GROUP BY NAME \
    ORDER BY TOTAL DESC, NAME ASC";

const OPERATIONS_PER_MINUTE_SQL: &str = "\
    SELECT strftime('%Y-%m-%d %H:%M', DATAHORA) AS MINUTE, \
           COALESCE(FUNCAO, '(unknown)') AS NAME, \
           COUNT(*) AS TOTAL \
    FROM indigo_cad.MCLOG \
    WHERE julianday(DATAHORA) >= julianday(?1) AND julianday(DATAHORA) < julianday(?2) \
    GROUP BY MINUTE, NAME \
    ORDER BY MINUTE, NAME";

const RECENT_ERRORS_SQL: &str = "\
    SELECT ID, USUARIO, DATAHORA, FUNCAO, IAE, OUTRAS_INFO, CODIGO_CLIENTE \
    FROM indigo_cad.MCLOG \
    WHERE IAE = 'E' AND (?1 IS NULL OR julianday(DATAHORA) >= julianday(?1)) \
    ORDER BY julianday(DATAHORA) DESC, ID DESC \
    LIMIT ?2";

const WINDOW_SOURCE: &str = "\
    SELECT * FROM indigo_pix.TIXLOG \
    WHERE julianday(DATAHORA) >= julianday(?1) AND julianday(DATAHORA) < julianday(?2)";

const LATEST_ROWS_SOURCE: &str = "SELECT * FROM indigo_pix.TIXLOG ORDER BY ID DESC LIMIT ?1";

const CONTROL_NUMBER_SOURCE: &str = "SELECT * FROM indigo_pix.TIXLOG WHERE NR_CONTROLE = ?1";

/// Per-control-number timing over one of the static row sources above.
///
/// Direction ranks OUT over IN over undefined: a transaction is OUT if any
/// of its rows looks like a debit.
fn timing_sql(source: &str) -> String {
    format!(
        "WITH SOURCE AS ({source}) \
         SELECT NR_CONTROLE, \
                MAX(CASE \
                      WHEN USUARIO = 'envia_pix_prod' OR icontains(DESCRICAO, 'DÉBITO') THEN 2 \
                      WHEN USUARIO = 'recebe_pix_prod' OR icontains(DESCRICAO, 'CRÉDITO') THEN 1 \
                      ELSE 0 \
                    END) AS DIRECTION, \
                MIN(DATAHORA) AS FIRST_SEEN, \
                MAX(DATAHORA) AS LAST_SEEN, \
                CAST(ROUND((MAX(julianday(DATAHORA)) - MIN(julianday(DATAHORA))) * 86400000.0) AS INTEGER) AS DURATION_MS, \
                COUNT(*) AS STEPS \
         FROM SOURCE \
         WHERE NR_CONTROLE IS NOT NULL \
         GROUP BY NR_CONTROLE \
         ORDER BY NR_CONTROLE"
    )
}

fn fetch(
    executor: &dyn QueryExecutor,
    panel: &str,
    sql: &str,
    params: &[Value],
) -> Result<Vec<ResultRow>> {
    debug!(panel, "dispatching statistics query");
    let rows = executor
        .fetch(sql, params)
        .map_err(|e| Error::query(format!("statistics panel {panel}"), e))?;
    debug!(panel, rows = rows.len(), "statistics query returned");
    Ok(rows)
}

fn count_of(row: &ResultRow) -> u64 {
    row.get_i64("TOTAL")
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0)
}

/// TIXLOG entries per minute, zero-filled over the window.
pub fn entries_per_minute(
    executor: &dyn QueryExecutor,
    window: &TimeWindow,
    counting: EntryCount,
) -> Result<Vec<MinuteBucket>> {
    let sql = match counting {
        EntryCount::Rows => ENTRIES_PER_MINUTE_SQL,
        EntryCount::NewControlNumbers => NEW_CONTROL_NUMBERS_PER_MINUTE_SQL,
    };
    let rows = fetch(executor, "entries_per_minute", sql, &window.bounds())?;

    let counts: HashMap<String, u64> = rows
        .iter()
        .filter_map(|row| Some((row.get_str("MINUTE")?.to_string(), count_of(row))))
        .collect();

    Ok(window
        .minutes()
        .into_iter()
        .map(|minute| MinuteBucket {
            count: counts.get(&minute_key(minute)).copied().unwrap_or(0),
            minute,
        })
        .collect())
}

/// MCLOG CAD operations per function, most frequent first.
pub fn operations_by_function(
    executor: &dyn QueryExecutor,
    window: &TimeWindow,
) -> Result<Vec<FunctionCount>> {
    let rows = fetch(
        executor,
        "operations_by_function",
        OPERATIONS_BY_FUNCTION_SQL,
        &window.bounds(),
    )?;
    Ok(rows
        .iter()
        .map(|row| FunctionCount {
            function: row.get_str("NAME").unwrap_or("(unknown)").to_string(),
            count: count_of(row),
        })
        .collect())
}

/// MCLOG CAD operations per function per minute.
///
/// Functions are sorted by name; every series covers every minute of the window.
pub fn operations_per_minute(
    executor: &dyn QueryExecutor,
    window: &TimeWindow,
) -> Result<OperationsTimeline> {
    let rows = fetch(
        executor,
        "operations_per_minute",
        OPERATIONS_PER_MINUTE_SQL,
        &window.bounds(),
    )?;

    let minutes = window.minutes();
    let index: HashMap<String, usize> = minutes
        .iter()
        .enumerate()
        .map(|(i, m)| (minute_key(*m), i))
        .collect();

    let mut series: BTreeMap<String, Vec<u64>> = BTreeMap::new();
    for row in &rows {
        let (Some(minute), Some(name)) = (row.get_str("MINUTE"), row.get_str("NAME")) else {
            continue;
        };
        let Some(&slot) = index.get(minute) else {
            continue;
        };
        series
            .entry(name.to_string())
            .or_insert_with(|| vec![0; minutes.len()])[slot] += count_of(row);
    }

    Ok(OperationsTimeline {
        minutes,
        series: series
            .into_iter()
            .map(|(function, counts)| FunctionSeries { function, counts })
            .collect(),
    })
}

/// Newest MCLOG CAD error rows (`IAE = 'E'`), newest first.
pub fn recent_errors(
    executor: &dyn QueryExecutor,
    limit: usize,
    since: Option<NaiveDateTime>,
) -> Result<Vec<ResultRow>> {
    if limit == 0 {
        return Err(Error::validation("limit", "must be greater than 0"));
    }
    let since = since.map_or(Value::Null, |ts| Value::Text(to_sql_timestamp(ts)));
    let limit = Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX));
    fetch(executor, "recent_errors", RECENT_ERRORS_SQL, &[since, limit])
}

/// Per-transaction timings and duration distributions per direction.
pub fn transaction_performance(
    executor: &dyn QueryExecutor,
    source: &PerformanceSource,
) -> Result<PerformanceReport> {
    let (sql, params) = match source {
        PerformanceSource::Window(window) => (timing_sql(WINDOW_SOURCE), window.bounds().to_vec()),
        PerformanceSource::LatestRows(0) => {
            return Err(Error::validation("latest_rows", "must be greater than 0"))
        }
        PerformanceSource::LatestRows(n) => (
            timing_sql(LATEST_ROWS_SOURCE),
            vec![Value::Integer(i64::try_from(*n).unwrap_or(i64::MAX))],
        ),
    };
    let rows = fetch(executor, "transaction_performance", &sql, &params)?;

    let transactions: Vec<TransactionTiming> = rows
        .iter()
        .filter_map(|row| {
            Some(TransactionTiming {
                control_number: row.get_str("NR_CONTROLE")?.to_string(),
                direction: Direction::from_code(row.get_i64("DIRECTION").unwrap_or(0)),
                duration_ms: row.get_i64("DURATION_MS").unwrap_or(0),
                steps: row
                    .get_i64("STEPS")
                    .and_then(|n| u64::try_from(n).ok())
                    .unwrap_or(0),
            })
        })
        .collect();

    let mut durations: BTreeMap<Direction, Vec<i64>> = BTreeMap::new();
    for timing in &transactions {
        durations
            .entry(timing.direction)
            .or_default()
            .push(timing.duration_ms);
    }
    let by_direction = durations
        .into_iter()
        .filter_map(|(direction, values)| {
            DurationStats::from_durations(&values).map(|stats| (direction, stats))
        })
        .collect();

    Ok(PerformanceReport {
        transactions,
        by_direction,
    })
}

/// Timing summary of one control number; `None` when it has no TIXLOG rows.
pub fn transaction_summary(
    executor: &dyn QueryExecutor,
    control_number: &str,
) -> Result<Option<TransactionSummary>> {
    let control_number = control_number.trim();
    if control_number.is_empty() {
        return Err(Error::validation("control_number", "must not be blank"));
    }
    let rows = fetch(
        executor,
        "transaction_summary",
        &timing_sql(CONTROL_NUMBER_SOURCE),
        &[Value::Text(control_number.to_string())],
    )?;

    Ok(rows.first().map(|row| TransactionSummary {
        control_number: row
            .get_str("NR_CONTROLE")
            .unwrap_or(control_number)
            .to_string(),
        direction: Direction::from_code(row.get_i64("DIRECTION").unwrap_or(0)),
        first_seen: row.get_str("FIRST_SEEN").unwrap_or_default().to_string(),
        last_seen: row.get_str("LAST_SEEN").unwrap_or_default().to_string(),
        duration_ms: row.get_i64("DURATION_MS").unwrap_or(0),
        steps: row
            .get_i64("STEPS")
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0),
    }))
}
