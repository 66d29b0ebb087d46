//! Registry compliance manager CLI
//!
//! Thin driver over `regmgmt-core`: parses arguments, sets up logging and
//! turns the run verdict into the process exit code.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;
use regmgmt_core::RunMode;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialize logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Commands::Detect(args) => commands::run_evaluate(&args, RunMode::Detect),
        Commands::Remediate(args) => commands::run_evaluate(&args, RunMode::Remediate),
    }
}
