//! CLI module
//!
//! Provides:
//! - Argument parsing (clap)
//! - Configuration root resolution (flag → env → cwd)
//! - Command dispatch (search, stats, summary, modes, check)
//! - Text and JSON output

pub mod args;
pub mod config_root;
pub mod dispatch;
pub mod output;

// Re-exports
pub use args::{parse_args, Args, Command, Panel};
pub use config_root::resolve_config_root;
pub use dispatch::{exit_code_for, run_cli};

/// Exit code wrapper for CLI operations
pub type ExitCode = i32;

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: ExitCode = 0;
pub const EXIT_FAILURE: ExitCode = 1;
pub const EXIT_CONFIG_ERROR: ExitCode = 2;
