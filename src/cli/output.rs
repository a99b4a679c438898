//! Output formatting: JSON or plain text tables

use crate::catalog::{template_for, SearchMode};
use crate::connection::row::display_value;
use crate::connection::ResultRow;
use crate::insights::{self, SearchInsights};
use crate::search::{GroupRole, SearchResult};
use crate::stats::{
    Dashboard, FunctionCount, MinuteBucket, OperationsTimeline, PanelResult, PerformanceReport,
    TransactionSummary,
};
use serde::Serialize;
use std::fmt::Write;
use std::io::Write as IoWrite;

/// Widest cell printed in text tables
const MAX_CELL_WIDTH: usize = 60;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn print_text(text: &str) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

/// Search result plus the derived insights
#[derive(Serialize)]
pub struct SearchOutput<'a> {
    #[serde(flatten)]
    pub result: &'a SearchResult,
    #[serde(skip_serializing_if = "SearchInsights::is_empty")]
    pub insights: SearchInsights,
}

impl<'a> SearchOutput<'a> {
    pub fn new(result: &'a SearchResult) -> Self {
        Self {
            result,
            insights: insights::for_search(result),
        }
    }
}

#[derive(Serialize)]
pub struct ModeEntry {
    pub mode: SearchMode,
    pub description: &'static str,
    pub tables: Vec<String>,
    pub required: Vec<&'static str>,
}

pub fn mode_entries() -> Vec<ModeEntry> {
    SearchMode::ALL
        .into_iter()
        .map(|mode| ModeEntry {
            mode,
            description: mode.description(),
            tables: template_for(mode)
                .iter()
                .map(|t| t.table.qualified())
                .collect(),
            required: vec![mode.lookup_field().name()],
        })
        .collect()
}

pub fn render_modes(entries: &[ModeEntry]) -> String {
    let rows: Vec<ResultRow> = entries
        .iter()
        .map(|e| {
            ResultRow::new()
                .with("MODE", e.mode.name())
                .with("FIELD", e.required.join(", "))
                .with("TABLES", e.tables.join(", "))
                .with("DESCRIPTION", e.description)
        })
        .collect();
    render_rows(&rows)
}

/// Aligned text table; columns taken from the first row.
pub fn render_rows(rows: &[ResultRow]) -> String {
    let Some(first) = rows.first() else {
        return "(no rows)\n".to_string();
    };
    let headers: Vec<&str> = first.column_names().collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h).map(|v| cell(&display_value(v))).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    push_line(&mut out, widths.iter().map(|w| "-".repeat(*w)), &widths);
    for row in cells {
        push_line(&mut out, row.into_iter(), &widths);
    }
    out
}

fn push_line(out: &mut String, values: impl Iterator<Item = String>, widths: &[usize]) {
    let line: Vec<String> = values
        .zip(widths)
        .map(|(v, w)| {
            let pad = w.saturating_sub(v.chars().count());
            format!("{v}{}", " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

fn cell(value: &str) -> String {
    let flat: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() > MAX_CELL_WIDTH {
        let cut: String = flat.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

pub fn render_search(result: &SearchResult) -> String {
    let mut out = String::new();
    if let Some(summary) = &result.summary {
        out.push_str(&render_summary(summary));
        out.push('\n');
    }
    for group in &result.groups {
        let role = match group.role {
            GroupRole::Primary => "results",
            GroupRole::Complementary => "complementary results",
        };
        let _ = writeln!(
            out,
            "== {} {} ({}): {} rows",
            group.label,
            role,
            group.source,
            group.rows.len()
        );
        if !group.rows.is_empty() {
            out.push_str(&render_rows(&group.rows));
        }
        out.push('\n');
    }

    let insights = insights::for_search(result);
    if let Some(status) = &insights.mix100_status {
        let _ = writeln!(out, "Latest MIX100 status: {}", status.description());
    }
    if let Some(decision) = &insights.kyt_decision {
        let action = match (&decision.action, decision.json_error) {
            (Some(action), _) => action.as_str(),
            (None, true) => "(malformed JSON)",
            (None, false) => "n/a",
        };
        let _ = writeln!(
            out,
            "KYT decision: {action} at {}",
            decision.decided_at.as_deref().unwrap_or("n/a")
        );
    }
    if result.is_empty() {
        out.push_str("No results found.\n");
    }
    out
}

pub fn render_summary(summary: &TransactionSummary) -> String {
    format!(
        "Transaction {}: {} | {} ms | {} steps | {} -> {}\n",
        summary.control_number,
        summary.direction,
        summary.duration_ms,
        summary.steps,
        summary.first_seen,
        summary.last_seen
    )
}

pub fn render_buckets(buckets: &[MinuteBucket]) -> String {
    let rows: Vec<ResultRow> = buckets
        .iter()
        .map(|b| {
            ResultRow::new()
                .with("MINUTE", b.minute.format("%Y-%m-%d %H:%M").to_string())
                .with("COUNT", b.count)
        })
        .collect();
    render_rows(&rows)
}

pub fn render_function_counts(counts: &[FunctionCount]) -> String {
    let rows: Vec<ResultRow> = counts
        .iter()
        .map(|c| {
            ResultRow::new()
                .with("FUNCTION", c.function.as_str())
                .with("COUNT", c.count)
        })
        .collect();
    render_rows(&rows)
}

/// Only minutes with at least one operation are listed.
pub fn render_timeline(timeline: &OperationsTimeline) -> String {
    let rows: Vec<ResultRow> = timeline
        .minutes
        .iter()
        .enumerate()
        .filter(|(i, _)| timeline.series.iter().any(|s| s.counts[*i] > 0))
        .map(|(i, minute)| {
            timeline.series.iter().fold(
                ResultRow::new().with("MINUTE", minute.format("%Y-%m-%d %H:%M").to_string()),
                |row, s| row.with(s.function.as_str(), s.counts[i]),
            )
        })
        .collect();
    render_rows(&rows)
}

pub fn render_performance(report: &PerformanceReport) -> String {
    let rows: Vec<ResultRow> = report
        .by_direction
        .iter()
        .map(|(direction, stats)| {
            ResultRow::new()
                .with("DIRECTION", direction.as_str())
                .with("COUNT", stats.count)
                .with("MIN_MS", stats.min_ms)
                .with("MEAN_MS", format!("{:.1}", stats.mean_ms))
                .with("MEDIAN_MS", format!("{:.1}", stats.median_ms))
                .with("P95_MS", format!("{:.1}", stats.p95_ms))
                .with("MAX_MS", stats.max_ms)
        })
        .collect();
    format!(
        "{} transactions\n{}",
        report.transactions.len(),
        render_rows(&rows)
    )
}

fn render_panel<T>(out: &mut String, title: &str, panel: &PanelResult<T>, render: impl Fn(&T) -> String) {
    let _ = writeln!(out, "== {title}");
    match panel {
        PanelResult::Ready(value) => out.push_str(&render(value)),
        PanelResult::Failed { message } => {
            let _ = writeln!(out, "unavailable: {message}");
        }
    }
    out.push('\n');
}

pub fn render_dashboard(board: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Window: {} -> {}\n",
        board.window.start().format("%Y-%m-%d %H:%M:%S"),
        board.window.end().format("%Y-%m-%d %H:%M:%S")
    );
    render_panel(&mut out, "Entries per minute", &board.entries, |b| {
        render_buckets(b)
    });
    render_panel(&mut out, "Operations by function", &board.operations, |c| {
        render_function_counts(c)
    });
    render_panel(&mut out, "Recent errors", &board.errors, |r| render_rows(r));
    render_panel(&mut out, "Transaction performance", &board.performance, |p| {
        render_performance(p)
    });
    out
}
