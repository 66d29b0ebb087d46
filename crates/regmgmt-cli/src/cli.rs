//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Registry compliance manager - detect and remediate registry drift
#[derive(Parser, Debug)]
#[command(name = "regmgmt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Report settings that do not match the configuration
    ///
    /// Exits with 1 when any setting is non-compliant.
    Detect(EvaluateArgs),

    /// Correct settings that do not match the configuration
    ///
    /// Every change is verified by reading it back. Exits with 1 when any
    /// remediation failed.
    ///
    /// Examples:
    ///   regmgmt remediate -c settings.toml
    ///   regmgmt remediate -c settings.toml --scope machine
    ///   regmgmt remediate -c settings.toml --snapshot registry.toml --json
    Remediate(EvaluateArgs),
}

/// Which scopes to evaluate
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeArg {
    #[default]
    All,
    User,
    Machine,
}

/// Options shared by detect and remediate
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EvaluateArgs {
    /// Settings file (TOML)
    #[arg(short, long, env = "REGMGMT_CONFIG")]
    pub config: PathBuf,

    /// Limit evaluation to one scope
    #[arg(long, value_enum, default_value_t = ScopeArg::All)]
    pub scope: ScopeArg,

    /// Only evaluate the named groups (repeatable)
    #[arg(short, long)]
    pub group: Vec<String>,

    /// Evaluate user scope for these SIDs instead of the loaded user hives
    #[arg(long)]
    pub sid: Vec<String>,

    /// Evaluate against a registry snapshot instead of the live registry
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}
