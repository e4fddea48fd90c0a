mod check;
mod cli;
mod config;
mod utils;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

const EXIT_NOT_READY: i32 = 1;
const EXIT_ERROR: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = if cli.list {
        check::list_checks(cli.config.as_deref(), cli.workspace.as_deref()).map(|_| true)
    } else {
        check::run_check(&check::CheckOptions {
            workspace: cli.workspace,
            config: cli.config,
            report: cli.report,
            format: cli.format,
            verbose: cli.verbose,
        })
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_NOT_READY),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_ERROR);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = match std::env::var("RUST_LOG") {
        Ok(value) => EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new(default)),
        Err(_) => EnvFilter::new(default),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
