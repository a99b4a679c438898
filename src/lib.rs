//! logscope: read-only search and statistics over PIX transaction logs
//!
//! The log catalogs (`indigo_pix`, `indigo_cad`, `indigo_cct`) are opened
//! through one query-only session. Every statement is a fixed template with
//! bound parameters; nothing here writes to the logs.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod connection;
pub mod errors;
pub mod insights;
pub mod logging;
pub mod search;
pub mod stats;

pub use errors::{Error, Result};

// Re-export the query surface
pub use catalog::{FilterField, SearchMode};
pub use config::{ConnectionString, Settings};
pub use connection::{ConnectionProvider, QueryExecutor, ResultRow, Session};
pub use search::{search, search_with, FilterInput, SearchOptions, SearchResult};
