//! Bundlecheck CLI entry point.

use clap::Parser;
use bundlecheck::cli::{self, Cli, Commands, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "BUNDLECHECK_LOG";

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Check(args) if args.verbose);
    init_logging(verbose);

    let exit_code = match cli.command {
        Commands::Check(args) => match cli::run_check(&args) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                EXIT_ERROR
            }
        },
        Commands::Policy(args) => match cli::run_policy(&args) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                EXIT_ERROR
            }
        },
    };

    std::process::exit(exit_code);
}
