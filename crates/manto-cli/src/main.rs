mod cli;
mod commands;
mod config;
mod data;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("mantoQSAR CLI v{} starting up", env!("CARGO_PKG_VERSION"));
    debug!(?cli, "parsed command line");

    if let Some(threads) = cli.threads {
        info!(threads, "configuring the global worker pool");
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| {
                error!("failed to build the worker pool: {e}");
                crate::error::CliError::Other(e.to_string())
            })?;
    }

    match cli.command {
        Commands::Descriptors(args) => commands::descriptors::run(args),
        Commands::Model(args) => commands::model::run(args),
        Commands::Screen(args) => commands::screen::run(args),
    }
}
