//! CLI command dispatch
//!
//! Resolves the configuration root, opens one session, runs the command and
//! maps the outcome to an exit code.

use crate::catalog::SearchMode;
use crate::cli::args::{Args, Command, Panel};
use crate::cli::config_root::{config_root_display, resolve_config_root};
use crate::cli::output::{self, SearchOutput};
use crate::cli::{ExitCode, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::Settings;
use crate::connection::{ConnectionProvider, Session};
use crate::errors::Error;
use crate::search::{search_with, FilterInput, SearchOptions};
use crate::stats::{
    self, local_now, DashboardRequest, EntryCount, PerformanceRows, PerformanceSource, StatsCache,
    WindowSpec,
};
use anyhow::Context;
use serde_json::json;
use tracing::{info, warn};

/// Run a parsed command line and return the process exit code.
///
/// `modes` runs without configuration. Every other command resolves the
/// configuration root, loads `config.toml`, opens one read-only session and
/// runs against it. Errors are printed to stderr with their context chain.
///
/// # Arguments
///
/// * `args` - Parsed command line from [`parse_args`](crate::cli::parse_args)
///
/// # Returns
///
/// * `EXIT_SUCCESS` (0) when the command completed
/// * `EXIT_FAILURE` (1) for validation, unknown mode and query errors
/// * `EXIT_CONFIG_ERROR` (2) for configuration and connection errors
pub fn run_cli(args: Args) -> ExitCode {
    match run(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_code_for(&e)
        }
    }
}

/// Map an error to its exit code.
///
/// # Arguments
///
/// * `err` - Error returned by a command, possibly wrapped in context
///
/// # Returns
///
/// `EXIT_CONFIG_ERROR` when the root cause is a configuration or connection
/// [`Error`], `EXIT_FAILURE` for every other error including ones that are
/// not a crate [`Error`] at all.
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_fatal() || e.is_retryable() => EXIT_CONFIG_ERROR,
        _ => EXIT_FAILURE,
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let json = args.json;

    // Needs no database
    if args.command == Command::Modes {
        let entries = output::mode_entries();
        return if json {
            output::print_json(&entries)
        } else {
            output::print_text(&output::render_modes(&entries))
        };
    }

    let root = resolve_config_root(args.config_root)?;
    let settings = Settings::load(&root)
        .with_context(|| format!("loading configuration from {}", config_root_display(&root)))?;
    let provider = ConnectionProvider::from_settings(&settings)?;
    let session = provider.acquire()?;

    let outcome = run_command(&session, &settings, args.command, json);
    let closed = session.close();
    outcome?;
    closed?;
    Ok(())
}

fn run_command(
    session: &Session,
    settings: &Settings,
    command: Command,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Command::Search { mode, values } => run_search(session, settings, &mode, &values, json),
        Command::Stats {
            panel,
            hours,
            limit,
            latest_rows,
            new_control_numbers,
        } => {
            let request = DashboardRequest {
                window: WindowSpec::LastHours(hours.unwrap_or(settings.stats.window_hours)),
                entry_count: if new_control_numbers {
                    EntryCount::NewControlNumbers
                } else {
                    EntryCount::Rows
                },
                error_limit: limit.unwrap_or(settings.stats.error_limit),
                performance: match latest_rows {
                    Some(n) => {
                        PerformanceRows::LatestRows(n.unwrap_or(settings.stats.performance_rows))
                    }
                    None => PerformanceRows::Window,
                },
            };
            run_stats(session, settings, panel, &request, json)
        }
        Command::Summary { control_number } => run_summary(session, &control_number, json),
        Command::Check => run_check(session, json),
        Command::Modes => Ok(()),
    }
}

fn run_search(
    session: &Session,
    settings: &Settings,
    mode: &str,
    values: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let mode: SearchMode = mode.parse()?;
    let filters = FilterInput::from_args(mode.lookup_field(), values);
    let result = search_with(
        session,
        mode,
        &filters,
        SearchOptions::from(&settings.search),
    )?;
    info!(mode = %mode, rows = result.total_rows(), "search finished");

    if json {
        output::print_json(&SearchOutput::new(&result))
    } else {
        output::print_text(&output::render_search(&result))
    }
}

fn run_stats(
    session: &Session,
    settings: &Settings,
    panel: Panel,
    request: &DashboardRequest,
    json: bool,
) -> anyhow::Result<()> {
    let now = local_now();

    if panel == Panel::All {
        let cache = StatsCache::from_settings(&settings.stats);
        let board = stats::dashboard(session, request, now, cache.as_ref())?;
        let failed = board.failed_panels();
        if failed > 0 {
            warn!(failed, "dashboard rendered with unavailable panels");
        }
        return if json {
            output::print_json(&board)
        } else {
            output::print_text(&output::render_dashboard(&board))
        };
    }

    let window = request.window.resolve(now)?;
    match panel {
        Panel::Entries => {
            let buckets = stats::entries_per_minute(session, &window, request.entry_count)?;
            emit(json, &buckets, || output::render_buckets(&buckets))
        }
        Panel::Operations => {
            let counts = stats::operations_by_function(session, &window)?;
            emit(json, &counts, || output::render_function_counts(&counts))
        }
        Panel::Timeline => {
            let timeline = stats::operations_per_minute(session, &window)?;
            emit(json, &timeline, || output::render_timeline(&timeline))
        }
        Panel::Errors => {
            let rows = stats::recent_errors(session, request.error_limit, Some(window.start()))?;
            emit(json, &rows, || output::render_rows(&rows))
        }
        Panel::Performance => {
            let source = match request.performance {
                PerformanceRows::Window => PerformanceSource::Window(window),
                PerformanceRows::LatestRows(n) => PerformanceSource::LatestRows(n),
            };
            let report = stats::transaction_performance(session, &source)?;
            emit(json, &report, || output::render_performance(&report))
        }
        Panel::All => Ok(()),
    }
}

fn run_summary(session: &Session, control_number: &str, json: bool) -> anyhow::Result<()> {
    let summary = stats::transaction_summary(session, control_number)?;
    if json {
        return output::print_json(&summary);
    }
    match &summary {
        Some(summary) => output::print_text(&output::render_summary(summary)),
        None => output::print_text(&format!(
            "No TIXLOG rows for control number {}",
            control_number.trim()
        )),
    }
}

fn run_check(session: &Session, json: bool) -> anyhow::Result<()> {
    session.ping()?;
    let catalogs: Vec<&str> = session.catalogs().iter().map(|c| c.name()).collect();
    if json {
        output::print_json(&json!({ "status": "ok", "catalogs": catalogs }))
    } else {
        output::print_text(&format!("ok: {}", catalogs.join(", ")))
    }
}

fn emit<T: serde::Serialize>(
    json: bool,
    value: &T,
    render: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        output::print_json(value)
    } else {
        output::print_text(&render())
    }
}
