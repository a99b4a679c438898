//! logscope command line

use logscope::cli::{parse_args, run_cli, EXIT_CONFIG_ERROR};
use logscope::logging::{self, LogFormat};

fn main() {
    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    if let Err(e) = logging::init(LogFormat::from_flag(args.log_json)) {
        eprintln!("Error: {e:#}");
        std::process::exit(EXIT_CONFIG_ERROR);
    }

    std::process::exit(run_cli(args));
}
