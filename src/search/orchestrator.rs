//! Search orchestration
//!
//! Validate every template's inputs, run the templates in order, then the
//! complementary MCLOG CAD lookups and the transaction summary.

use super::filters::{validate_field, FilterInput, Lookup};
use super::types::{GroupRole, ResultGroup, SearchResult};
use crate::catalog::{complement_for, template_for, QueryTemplate, SearchMode};
use crate::config::SearchSettings;
use crate::connection::{QueryExecutor, ResultRow};
use crate::errors::{Error, Result};
use crate::stats;
use rusqlite::types::Value;
use std::collections::HashSet;
use tracing::debug;

/// Knobs that change what a search runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub complementary_mclog: bool,
    pub include_summary: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            complementary_mclog: true,
            include_summary: true,
        }
    }
}

impl From<&SearchSettings> for SearchOptions {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            complementary_mclog: settings.complementary_mclog,
            ..Self::default()
        }
    }
}

/// Run `mode` with default options.
pub fn search(
    executor: &dyn QueryExecutor,
    mode: SearchMode,
    filters: &FilterInput,
) -> Result<SearchResult> {
    search_with(executor, mode, filters, SearchOptions::default())
}

pub fn search_with(
    executor: &dyn QueryExecutor,
    mode: SearchMode,
    filters: &FilterInput,
    options: SearchOptions,
) -> Result<SearchResult> {
    let planned = plan(mode, filters)?;

    let mut groups = Vec::with_capacity(planned.len() + 1);
    for (template, lookup) in &planned {
        let rows = run_template(executor, mode, template, lookup)?;
        groups.push(ResultGroup {
            source: template.table,
            label: template.label.to_string(),
            role: GroupRole::Primary,
            rows,
        });
    }

    if options.complementary_mclog {
        if let (Some(complement), Some((_, lookup))) = (complement_for(mode), planned.first()) {
            groups.push(run_complement(executor, mode, complement, lookup)?);
        }
    }

    let summary = match (planned.first(), options.include_summary && mode.has_summary()) {
        (Some((_, Lookup::Single(control_number))), true) => {
            stats::transaction_summary(executor, control_number)?
        }
        _ => None,
    };

    let result = SearchResult {
        mode,
        groups,
        summary,
    };
    debug!(
        mode = %mode,
        groups = result.groups.len(),
        rows = result.total_rows(),
        "search finished"
    );
    Ok(result)
}

/// Validate inputs for every template of `mode`; nothing is executed.
fn plan(
    mode: SearchMode,
    filters: &FilterInput,
) -> Result<Vec<(&'static QueryTemplate, Lookup)>> {
    template_for(mode)
        .iter()
        .map(|template| -> Result<(&'static QueryTemplate, Lookup)> {
            for field in template.required {
                validate_field(*field, filters)?;
            }
            Ok((template, validate_field(template.lookup_field(), filters)?))
        })
        .collect()
}

fn run_template(
    executor: &dyn QueryExecutor,
    mode: SearchMode,
    template: &QueryTemplate,
    lookup: &Lookup,
) -> Result<Vec<ResultRow>> {
    let params = [lookup.to_param(), Value::Integer(i64::from(template.row_limit))];
    debug!(mode = %mode, table = %template.table, "dispatching search query");
    let rows = executor
        .fetch(template.sql, &params)
        .map_err(|e| Error::query(format!("search {mode} on {}", template.table), e))?;
    debug!(mode = %mode, table = %template.table, rows = rows.len(), "search query returned");
    Ok(rows)
}

/// One free-text lookup per value, merged without duplicate rows.
fn run_complement(
    executor: &dyn QueryExecutor,
    mode: SearchMode,
    template: &QueryTemplate,
    lookup: &Lookup,
) -> Result<ResultGroup> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for value in lookup.values() {
        let found = run_template(executor, mode, template, &Lookup::Single(value.to_string()))?;
        for row in found {
            if seen.insert(row_key(&row)) {
                rows.push(row);
            }
        }
    }
    Ok(ResultGroup {
        source: template.table,
        label: template.label.to_string(),
        role: GroupRole::Complementary,
        rows,
    })
}

fn row_key(row: &ResultRow) -> String {
    serde_json::to_string(row).unwrap_or_default()
}
