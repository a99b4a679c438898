//! Error taxonomy
//!
//! Every failure the core can produce maps onto one of five kinds:
//! - `Configuration`: bad or missing connection setup (fatal at startup)
//! - `Connection`: a catalog is unreachable (retryable)
//! - `Validation`: bad or missing user input (inline, non-fatal)
//! - `QueryExecution`: the database rejected or failed a query (scoped)
//! - `UnknownMode`: a search mode name outside the closed set

/// Core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("cannot connect to '{target}': {reason}")]
    Connection { target: String, reason: String },

    #[error("invalid '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("query failed in {scope}: {source}")]
    QueryExecution {
        scope: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("unknown search mode: {0}")]
    UnknownMode(String),
}

impl Error {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn query(scope: impl Into<String>, source: rusqlite::Error) -> Self {
        Error::QueryExecution {
            scope: scope.into(),
            source,
        }
    }

    /// Only connection failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Failures that abort startup rather than a single request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connection_errors_are_retryable() {
        let conn = Error::Connection {
            target: "indigo_pix".to_string(),
            reason: "missing".to_string(),
        };
        assert!(conn.is_retryable());
        assert!(!Error::validation("control_number", "empty").is_retryable());
        assert!(!Error::Configuration("x".to_string()).is_retryable());
        assert!(!Error::query("stats", rusqlite::Error::InvalidQuery).is_retryable());
    }

    #[test]
    fn test_configuration_is_fatal() {
        assert!(Error::Configuration("no connection string".to_string()).is_fatal());
        assert!(!Error::UnknownMode("x".to_string()).is_fatal());
    }

    #[test]
    fn test_display_names_scope() {
        let err = Error::query("search tixlog-origin", rusqlite::Error::InvalidQuery);
        assert!(err.to_string().contains("search tixlog-origin"));
    }
}
