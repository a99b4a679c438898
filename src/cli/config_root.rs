//! Configuration root resolution
//!
//! Priority:
//! 1. `--config-root <dir>` flag
//! 2. `$LOGSCOPE_HOME`
//! 3. Current directory

use crate::errors::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const HOME_ENV: &str = "LOGSCOPE_HOME";

/// Resolve the directory holding `config.toml`.
///
/// Priority:
/// 1. `explicit` (the `--config-root` flag), which must be an existing directory
/// 2. `$LOGSCOPE_HOME` when set and non-empty
/// 3. The current directory
///
/// # Arguments
///
/// * `explicit` - Directory given on the command line, if any
///
/// # Returns
///
/// The configuration root, or `Error::Configuration` when an explicit
/// directory does not exist. The environment value is not checked here;
/// a missing `config.toml` under it falls back to defaults.
pub fn resolve_config_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    resolve_with_env(explicit, std::env::var_os(HOME_ENV))
}

fn resolve_with_env(explicit: Option<PathBuf>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_dir() {
            return Err(Error::Configuration(format!(
                "config root '{}' does not exist",
                path.display()
            )));
        }
        return Ok(path);
    }

    if let Some(home) = home.filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    Ok(PathBuf::from("."))
}

/// Display form of a configuration root for log lines and error context
///
/// # Arguments
///
/// * `root` - Directory returned by [`resolve_config_root`]
pub fn config_root_display(root: &Path) -> String {
    root.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_root_wins() {
        let temp_dir = TempDir::new().unwrap();
        let resolved = resolve_with_env(
            Some(temp_dir.path().to_path_buf()),
            Some(OsString::from("/somewhere/else")),
        )
        .unwrap();
        assert_eq!(resolved, temp_dir.path());
    }

    #[test]
    fn test_explicit_nonexistent_fails() {
        let result = resolve_with_env(Some(PathBuf::from("/nonexistent/logscope/12345")), None);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_env_then_current_dir() {
        assert_eq!(
            resolve_with_env(None, Some(OsString::from("/srv/logscope"))).unwrap(),
            PathBuf::from("/srv/logscope")
        );
        assert_eq!(resolve_with_env(None, None).unwrap(), PathBuf::from("."));
        assert_eq!(
            resolve_with_env(None, Some(OsString::new())).unwrap(),
            PathBuf::from(".")
        );
    }
}
