//! vue-spinach: converts Vue components from the Options API to the Composition API.

mod cli;
mod config;
mod output;
mod runner;

use clap::Parser;
use cli::Args;
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        init_logging();
    }

    let summary = runner::run(&args)?;
    if summary.is_failure() {
        std::process::exit(1);
    }
    Ok(())
}

/// Logs to stderr, honouring `RUST_LOG` when it is set.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vue_spinach=debug,spinach_transformer=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
