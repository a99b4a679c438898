//! CLI wiring tests: config root → settings → session → command → exit code

mod common;

use anyhow::Result;
use common::{Catalogs, TixlogRow};
use logscope::cli::{parse_args, run_cli, EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use std::path::Path;
use tempfile::TempDir;

/// Config root whose connection string points at `server`.
fn config_root(server: &Path) -> Result<TempDir> {
    let root = tempfile::tempdir()?;
    std::fs::write(
        root.path().join("config.toml"),
        format!(
            "[database]\nconnection_string = \"Driver=SQLite;Server={{{}}}\"\n\n[stats]\nwindow_hours = 2\n",
            server.display()
        ),
    )?;
    Ok(root)
}

fn run(root: &Path, rest: &[&str]) -> i32 {
    let root = root.to_str().unwrap();
    let mut argv = vec!["logscope", "--config-root", root];
    argv.extend_from_slice(rest);
    run_cli(parse_args(argv).unwrap())
}

// The environment override would replace the fixture connection string.
fn env_override_set() -> bool {
    std::env::var_os(logscope::config::CONNECTION_STRING_ENV).is_some()
}

#[test]
fn test_check_and_search_succeed() -> Result<()> {
    if env_override_set() {
        return Ok(());
    }
    let catalogs = Catalogs::create()?;
    catalogs.tixlog(TixlogRow {
        id: 1,
        control_number: Some("CTRL-001"),
        ..TixlogRow::default()
    })?;
    let root = config_root(catalogs.path())?;

    assert_eq!(run(root.path(), &["check"]), EXIT_SUCCESS);
    assert_eq!(
        run(root.path(), &["--json", "search", "cross-table-360", "CTRL-001"]),
        EXIT_SUCCESS
    );
    assert_eq!(
        run(root.path(), &["search", "tixlog-control-number-list", "CTRL-001,CTRL-002"]),
        EXIT_SUCCESS
    );
    assert_eq!(run(root.path(), &["stats", "--json"]), EXIT_SUCCESS);
    assert_eq!(
        run(root.path(), &["stats", "performance", "--latest-rows", "10"]),
        EXIT_SUCCESS
    );
    assert_eq!(run(root.path(), &["summary", "CTRL-001"]), EXIT_SUCCESS);
    Ok(())
}

#[test]
fn test_bad_requests_exit_with_failure() -> Result<()> {
    if env_override_set() {
        return Ok(());
    }
    let catalogs = Catalogs::create()?;
    let root = config_root(catalogs.path())?;

    assert_eq!(run(root.path(), &["search", "no-such-mode", "x"]), EXIT_FAILURE);
    assert_eq!(run(root.path(), &["search", "tixlog-origin", " "]), EXIT_FAILURE);
    assert_eq!(run(root.path(), &["stats", "errors", "--limit", "0"]), EXIT_FAILURE);
    assert_eq!(run(root.path(), &["stats", "entries", "--hours", "0"]), EXIT_FAILURE);
    assert_eq!(
        run(root.path(), &["stats", "entries", "--hours", "4294967295"]),
        EXIT_FAILURE
    );
    assert_eq!(run(root.path(), &["stats", "--hours", "1000000"]), EXIT_FAILURE);
    Ok(())
}

#[test]
fn test_missing_catalog_exits_with_config_error() -> Result<()> {
    if env_override_set() {
        return Ok(());
    }
    let empty = tempfile::tempdir()?;
    let root = config_root(empty.path())?;

    assert_eq!(run(root.path(), &["check"]), EXIT_CONFIG_ERROR);
    // nothing was created in the server directory
    assert_eq!(std::fs::read_dir(empty.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_malformed_config_exits_with_config_error() -> Result<()> {
    let root = tempfile::tempdir()?;
    std::fs::write(root.path().join("config.toml"), "[stats\nwindow_hours = ")?;
    assert_eq!(run(root.path(), &["check"]), EXIT_CONFIG_ERROR);
    Ok(())
}
