//! Configuration
//!
//! Settings live in `<config_root>/config.toml`. The connection string may
//! be overridden through `LOGSCOPE_CONNECTION_STRING` so that credentials
//! can be provisioned without touching the file.

pub mod connection_string;

pub use connection_string::{ConnectionString, Driver};

use crate::errors::{Error, Result};
use crate::stats::window::MAX_WINDOW_HOURS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Config file location: <config_root>/config.toml
pub const CONFIG_FILE: &str = "config.toml";

/// Environment override for `[database] connection_string`
pub const CONNECTION_STRING_ENV: &str = "LOGSCOPE_CONNECTION_STRING";

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub connection: ConnectionSettings,
    pub search: SearchSettings,
    pub stats: StatsSettings,
}

/// `[database]`
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub connection_string: Option<String>,
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// `[connection]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Extra acquisition attempts after a connection failure
    pub retries: u32,
    /// Pause between attempts
    pub retry_delay_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            retries: 0,
            retry_delay_ms: 500,
        }
    }
}

/// `[search]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Also look up TIXLOG search values in MCLOG CAD
    pub complementary_mclog: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            complementary_mclog: true,
        }
    }
}

/// `[stats]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSettings {
    pub window_hours: u32,
    pub error_limit: usize,
    pub performance_rows: usize,
    /// 0 disables the panel cache
    pub cache_ttl_secs: u64,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            window_hours: 24,
            error_limit: 1000,
            performance_rows: 100_000,
            cache_ttl_secs: 0,
        }
    }
}

impl Settings {
    /// Load settings from `<config_root>/config.toml`, applying the
    /// environment override for the connection string.
    ///
    /// A missing file yields defaults (the connection string may still come
    /// from the environment).
    pub fn load(config_root: &Path) -> Result<Self> {
        Self::load_with_override(config_root, std::env::var(CONNECTION_STRING_ENV).ok())
    }

    pub(crate) fn load_with_override(
        config_root: &Path,
        connection_override: Option<String>,
    ) -> Result<Self> {
        let path = config_root.join(CONFIG_FILE);
        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                Error::Configuration(format!("cannot read {}: {e}", path.display()))
            })?;
            let settings = Self::from_toml_str(&content)?;
            info!(path = %path.display(), "loaded configuration");
            settings
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        if let Some(value) = connection_override.filter(|v| !v.trim().is_empty()) {
            debug!("connection string taken from {CONNECTION_STRING_ENV}");
            settings.database.connection_string = Some(value);
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("invalid {CONFIG_FILE}: {e}")))
    }

    /// Parsed connection string; absent or malformed is a configuration error.
    pub fn connection_string(&self) -> Result<ConnectionString> {
        match self.database.connection_string.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse(),
            _ => Err(Error::Configuration(format!(
                "no connection string configured; set [database] connection_string in {CONFIG_FILE} or {CONNECTION_STRING_ENV}"
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.stats.window_hours == 0 || self.stats.window_hours > MAX_WINDOW_HOURS {
            return Err(Error::Configuration(format!(
                "stats.window_hours must be between 1 and {MAX_WINDOW_HOURS}"
            )));
        }
        if self.stats.error_limit == 0 {
            return Err(Error::Configuration(
                "stats.error_limit must be greater than 0".to_string(),
            ));
        }
        if self.stats.performance_rows == 0 {
            return Err(Error::Configuration(
                "stats.performance_rows must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
