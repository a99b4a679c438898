//! Database connection
//!
//! ## Architecture
//!
//! - `ConnectionProvider::acquire()`: open a read-only [`Session`], retrying
//!   connection failures a bounded number of times
//! - `Session`: one in-memory SQLite connection with every configured catalog
//!   attached under its own schema name (`indigo_pix`, `indigo_cad`, `indigo_cct`)
//! - Sessions are `query_only`; nothing in this crate writes to the catalogs

pub mod executor;
pub mod functions;
pub mod row;

pub use executor::{FakeExecutor, QueryExecutor};
pub use row::ResultRow;

use crate::catalog::Catalog;
use crate::config::{ConnectionSettings, ConnectionString, Settings};
use crate::errors::{Error, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Open read-only session over the attached catalogs
pub struct Session {
    conn: Connection,
    catalogs: Vec<Catalog>,
    target: String,
}

impl Session {
    /// Open a session described by `cs`.
    ///
    /// Every catalog file must already exist; a missing file is a
    /// connection error rather than an empty attach.
    pub fn open(cs: &ConnectionString) -> Result<Self> {
        let target = cs.server.display().to_string();
        if !cs.server.is_dir() {
            return Err(Error::Connection {
                target,
                reason: "server directory does not exist".to_string(),
            });
        }

        let conn = Connection::open_in_memory().map_err(|e| connection_error(&target, e))?;
        conn.busy_timeout(cs.busy_timeout)
            .map_err(|e| connection_error(&target, e))?;

        for catalog in &cs.catalogs {
            attach(&conn, &cs.server, *catalog)?;
        }

        functions::register(&conn).map_err(|e| connection_error(&target, e))?;
        conn.pragma_update(None, "query_only", true)
            .map_err(|e| connection_error(&target, e))?;

        info!(
            server = %target,
            catalogs = cs.catalogs.len(),
            user = cs.user.as_deref().unwrap_or(""),
            "session opened"
        );

        Ok(Session {
            conn,
            catalogs: cs.catalogs.clone(),
            target,
        })
    }

    pub fn catalogs(&self) -> &[Catalog] {
        &self.catalogs
    }

    /// Liveness check touching every attached catalog.
    pub fn ping(&self) -> Result<()> {
        for catalog in &self.catalogs {
            let sql = format!("SELECT count(*) FROM {}.sqlite_master", catalog.name());
            self.conn
                .query_row(&sql, [], |row| row.get::<_, i64>(0))
                .map_err(|e| connection_error(catalog.name(), e))?;
        }
        Ok(())
    }

    /// Close the session, reporting any error the close itself raises.
    pub fn close(self) -> Result<()> {
        let target = self.target;
        self.conn
            .close()
            .map_err(|(_, e)| connection_error(&target, e))?;
        debug!(server = %target, "session closed");
        Ok(())
    }
}

impl QueryExecutor for Session {
    fn fetch(&self, sql: &str, params: &[Value]) -> rusqlite::Result<Vec<ResultRow>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut result = ResultRow::new();
            for (idx, name) in names.iter().enumerate() {
                result.push(name.clone(), row::json_from_value_ref(row.get_ref(idx)?));
            }
            results.push(result);
        }
        Ok(results)
    }
}

fn attach(conn: &Connection, server: &Path, catalog: Catalog) -> Result<()> {
    let path = server.join(catalog.file_name());
    if !path.is_file() {
        return Err(Error::Connection {
            target: catalog.name().to_string(),
            reason: format!("catalog file {} not found", path.display()),
        });
    }
    let sql = format!("ATTACH DATABASE ?1 AS {}", catalog.name());
    conn.execute(&sql, [path.to_string_lossy().into_owned()])
        .map_err(|e| connection_error(catalog.name(), e))?;
    debug!(catalog = catalog.name(), path = %path.display(), "catalog attached");
    Ok(())
}

fn connection_error(target: &str, err: rusqlite::Error) -> Error {
    Error::Connection {
        target: target.to_string(),
        reason: err.to_string(),
    }
}

/// Hands out sessions for a parsed connection string
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    connection_string: ConnectionString,
    retries: u32,
    retry_delay: Duration,
}

impl ConnectionProvider {
    pub fn new(connection_string: ConnectionString, settings: &ConnectionSettings) -> Self {
        Self {
            connection_string,
            retries: settings.retries,
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
        }
    }

    /// Provider from loaded settings; fails if no connection string is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.connection_string()?, &settings.connection))
    }

    pub fn connection_string(&self) -> &ConnectionString {
        &self.connection_string
    }

    /// Open a session. Connection failures are retried up to `retries`
    /// more times; anything else fails immediately.
    pub fn acquire(&self) -> Result<Session> {
        let mut attempt = 0;
        loop {
            match Session::open(&self.connection_string) {
                Ok(session) => return Ok(session),
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max = self.retries,
                        error = %e,
                        "connection failed, retrying"
                    );
                    thread::sleep(self.retry_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Keep `session` if it still answers, otherwise open a fresh one.
    pub fn revalidate(&self, session: Session) -> Result<Session> {
        match session.ping() {
            Ok(()) => Ok(session),
            Err(e) => {
                warn!(error = %e, "session went stale, reconnecting");
                drop(session);
                self.acquire()
            }
        }
    }
}
