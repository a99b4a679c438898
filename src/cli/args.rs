//! CLI argument parsing
//!
//! ```text
//! logscope [--config-root DIR] [--json] [--log-json] <command>
//!
//! COMMANDS:
//!   search <mode> <value>...    Run a search (see `modes`)
//!   stats [panel]               Statistics panels (default: all)
//!   summary <control-number>    Transaction timing summary
//!   modes                       List search modes
//!   check                       Open the catalogs and ping them
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "logscope",
    version,
    about = "Read-only search and statistics over PIX transaction logs"
)]
pub struct Args {
    /// Directory holding config.toml (default: $LOGSCOPE_HOME, then cwd)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_root: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Search the logs
    Search {
        /// Search mode name, e.g. cross-table-360
        mode: String,
        /// Lookup value; list modes take several
        #[arg(required = true, num_args = 1..)]
        values: Vec<String>,
    },

    /// Statistics panels
    Stats {
        #[arg(value_enum, default_value_t = Panel::All)]
        panel: Panel,
        /// Window length in hours (default from config)
        #[arg(long)]
        hours: Option<u32>,
        /// Maximum error rows
        #[arg(long)]
        limit: Option<usize>,
        /// Analyse the newest N TIXLOG rows instead of the window
        /// (N defaults to `stats.performance_rows`)
        #[arg(long, value_name = "N", num_args = 0..=1)]
        latest_rows: Option<Option<usize>>,
        /// Count only the first appearance of each control number
        #[arg(long)]
        new_control_numbers: bool,
    },

    /// Timing summary for one control number
    Summary { control_number: String },

    /// List search modes
    Modes,

    /// Open every catalog and ping it
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Panel {
    Entries,
    Operations,
    Timeline,
    Errors,
    Performance,
    All,
}

/// Parse arguments (program name first).
pub fn parse_args<I, T>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args)
}
