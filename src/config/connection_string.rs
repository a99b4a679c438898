//! Connection string parsing
//!
//! ODBC-style `key=value` pairs separated by `;`. Keys are case-insensitive,
//! values may be wrapped in `{...}` (which may then contain `;`).
//!
//! ```text
//! Driver={SQLite3};Server=/srv/logs;Database=indigo_pix,indigo_cad;Uid=reader;Pwd=secret
//! ```

use crate::catalog::Catalog;
use crate::errors::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 30;
/// SQLite takes the busy timeout in milliseconds as a C int.
const MAX_BUSY_TIMEOUT_SECS: u64 = i32::MAX as u64 / 1000;

/// Supported drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Sqlite,
}

impl FromStr for Driver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            other => Err(Error::Configuration(format!(
                "unsupported driver '{other}' (expected SQLite)"
            ))),
        }
    }
}

/// Parsed connection string
#[derive(Clone, PartialEq)]
pub struct ConnectionString {
    pub driver: Driver,
    /// Directory holding one `<catalog>.db` file per catalog
    pub server: PathBuf,
    /// Catalogs to attach, in declaration order
    pub catalogs: Vec<Catalog>,
    pub user: Option<String>,
    password: Option<String>,
    pub busy_timeout: Duration,
}

impl ConnectionString {
    /// Connection string for a local directory with every catalog attached
    pub fn for_directory(server: impl Into<PathBuf>) -> Self {
        ConnectionString {
            driver: Driver::Sqlite,
            server: server.into(),
            catalogs: Catalog::ALL.to_vec(),
            user: None,
            password: None,
            busy_timeout: Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS),
        }
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("driver", &self.driver)
            .field("server", &self.server)
            .field("catalogs", &self.catalogs)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("busy_timeout", &self.busy_timeout)
            .finish()
    }
}

impl FromStr for ConnectionString {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::Configuration("connection string is empty".to_string()));
        }

        let mut driver = None;
        let mut server = None;
        let mut catalogs = None;
        let mut user = None;
        let mut password = None;
        let mut busy_timeout = Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS);

        for (key, value) in split_pairs(raw)? {
            match key.as_str() {
                "driver" => driver = Some(value.parse::<Driver>()?),
                "server" | "data source" => {
                    if value.is_empty() {
                        return Err(Error::Configuration("Server must not be empty".to_string()));
                    }
                    server = Some(PathBuf::from(value));
                }
                "database" => catalogs = Some(parse_catalogs(&value)?),
                "uid" | "user id" => user = Some(value),
                "pwd" | "password" => password = Some(value),
                "timeout" | "connection timeout" => {
                    let secs = value.parse::<u64>().map_err(|_| {
                        Error::Configuration(format!("Timeout must be whole seconds, got '{value}'"))
                    })?;
                    if secs > MAX_BUSY_TIMEOUT_SECS {
                        return Err(Error::Configuration(format!(
                            "Timeout must be at most {MAX_BUSY_TIMEOUT_SECS} seconds, got {secs}"
                        )));
                    }
                    busy_timeout = Duration::from_secs(secs);
                }
                other => debug!(key = other, "ignoring connection string key"),
            }
        }

        Ok(ConnectionString {
            driver: driver
                .ok_or_else(|| Error::Configuration("connection string has no Driver".to_string()))?,
            server: server
                .ok_or_else(|| Error::Configuration("connection string has no Server".to_string()))?,
            catalogs: catalogs.unwrap_or_else(|| Catalog::ALL.to_vec()),
            user,
            password,
            busy_timeout,
        })
    }
}

fn parse_catalogs(value: &str) -> Result<Vec<Catalog>> {
    let mut catalogs = Vec::new();
    for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let catalog = Catalog::from_name(name)
            .ok_or_else(|| Error::Configuration(format!("unknown catalog '{name}' in Database")))?;
        if !catalogs.contains(&catalog) {
            catalogs.push(catalog);
        }
    }
    if catalogs.is_empty() {
        return Err(Error::Configuration("Database lists no catalogs".to_string()));
    }
    Ok(catalogs)
}

/// Split into lower-cased keys and unwrapped values, honouring `{...}`.
fn split_pairs(raw: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    let mut segment = String::new();
    let mut in_braces = false;

    for ch in raw.chars() {
        match ch {
            '{' if !in_braces => {
                in_braces = true;
                segment.push(ch);
            }
            '}' if in_braces => {
                in_braces = false;
                segment.push(ch);
            }
            ';' if !in_braces => {
                push_pair(&mut pairs, &segment)?;
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }
    if in_braces {
        return Err(Error::Configuration(
            "connection string has an unterminated '{'".to_string(),
        ));
    }
    push_pair(&mut pairs, &segment)?;
    Ok(pairs)
}

fn push_pair(pairs: &mut Vec<(String, String)>, segment: &str) -> Result<()> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Ok(());
    }
    let (key, value) = segment.split_once('=').ok_or_else(|| {
        Error::Configuration(format!("malformed connection string segment '{}'", redact(segment)))
    })?;
    let key = key.trim().to_ascii_lowercase();
    if key.is_empty() {
        return Err(Error::Configuration("connection string has an empty key".to_string()));
    }
    if pairs.iter().any(|(k, _)| *k == key) {
        return Err(Error::Configuration(format!("duplicate connection string key '{key}'")));
    }
    let value = value.trim();
    let value = value
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(value);
    pairs.push((key, value.to_string()));
    Ok(())
}

/// Keep error messages free of anything that may be a secret.
fn redact(segment: &str) -> String {
    let lowered = segment.to_ascii_lowercase();
    if lowered.starts_with("pwd") || lowered.starts_with("password") {
        "***".to_string()
    } else {
        segment.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_connection_string() {
        let cs: ConnectionString =
            "Driver={SQLite3};Server=/srv/logs;Database=indigo_pix,indigo_cad;Uid=reader;Pwd=s3cret;Timeout=5"
                .parse()
                .unwrap();
        assert_eq!(cs.driver, Driver::Sqlite);
        assert_eq!(cs.server, PathBuf::from("/srv/logs"));
        assert_eq!(cs.catalogs, vec![Catalog::Pix, Catalog::Cad]);
        assert_eq!(cs.user.as_deref(), Some("reader"));
        assert!(cs.has_password());
        assert_eq!(cs.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_database_defaults_to_all_catalogs() {
        let cs: ConnectionString = "driver=sqlite;server=/data".parse().unwrap();
        assert_eq!(cs.catalogs, Catalog::ALL.to_vec());
        assert_eq!(cs.busy_timeout, Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS));
    }

    #[test]
    fn test_braced_value_may_contain_semicolon() {
        let cs: ConnectionString = "Driver=SQLite;Server={/srv/odd;dir}".parse().unwrap();
        assert_eq!(cs.server, PathBuf::from("/srv/odd;dir"));
    }

    #[test]
    fn test_missing_driver_is_configuration_error() {
        let err = "Server=/data".parse::<ConnectionString>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_unsupported_driver_is_rejected() {
        let err = "Driver={ODBC Driver 17 for SQL Server};Server=db01"
            .parse::<ConnectionString>()
            .unwrap_err();
        assert!(err.to_string().contains("unsupported driver"));
    }

    #[test]
    fn test_malformed_segment_is_rejected() {
        assert!("Driver=SQLite;Server".parse::<ConnectionString>().is_err());
        assert!("Driver=SQLite;Server={/data".parse::<ConnectionString>().is_err());
        assert!("".parse::<ConnectionString>().is_err());
    }

    #[test]
    fn test_oversized_timeout_is_rejected() {
        let err = "Driver=SQLite;Server=/d;Timeout=3000000"
            .parse::<ConnectionString>()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("at most 2147483 seconds"));

        let max = "Driver=SQLite;Server=/d;Timeout=2147483"
            .parse::<ConnectionString>()
            .unwrap();
        assert_eq!(max.busy_timeout, Duration::from_secs(MAX_BUSY_TIMEOUT_SECS));
    }

    #[test]
    fn test_unknown_catalog_is_rejected() {
        let err = "Driver=SQLite;Server=/d;Database=indigo_xyz"
            .parse::<ConnectionString>()
            .unwrap_err();
        assert!(err.to_string().contains("indigo_xyz"));
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        assert!("Driver=SQLite;Server=/a;server=/b"
            .parse::<ConnectionString>()
            .is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let cs: ConnectionString = "Driver=SQLite;Server=/d;Pwd=hunter2".parse().unwrap();
        let shown = format!("{:?}", cs);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("***"));
    }

    #[test]
    fn test_malformed_password_segment_is_redacted() {
        let err = "Driver=SQLite;Server=/d;Pwdhunter2"
            .parse::<ConnectionString>()
            .unwrap_err();
        assert!(!err.to_string().contains("hunter2"));
    }
}
