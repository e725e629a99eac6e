//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dbmarshal - numbered SQL revisions plus stored procedure and trigger
/// reconciliation
#[derive(Parser, Debug)]
#[command(name = "dbmarshal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding connection profiles (default: ~/.dbmarshal)
    #[arg(long, global = true, env = "DBMARSHAL_HOME")]
    pub home: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a connection profile under an alias
    Setup(SetupArgs),

    /// Show a saved connection profile (password masked)
    Describe(AliasArgs),

    /// Report applied and outstanding revisions and static object counts
    Status(StatusArgs),

    /// Rebuild procedures and triggers, then apply outstanding revisions
    Apply(AliasArgs),

    /// Write live procedures and triggers into the statics directory
    #[command(name = "export-statics")]
    ExportStatics(AliasArgs),
}

/// Arguments for the setup command
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Profile alias (letters, digits, `-` and `_`)
    pub alias: String,

    /// Database server host
    #[arg(long)]
    pub hostname: String,

    /// Database server port
    #[arg(long, default_value_t = 3306)]
    pub port: u16,

    /// Database user
    #[arg(long)]
    pub username: String,

    /// Database password
    #[arg(long, env = "DBMARSHAL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Database (schema) name; a file path for the duckdb driver
    #[arg(long)]
    pub database: String,

    /// Migrations root containing `revisions/` and `statics/`
    #[arg(long)]
    pub directory: PathBuf,

    /// Database driver
    #[arg(long, value_enum, default_value = "mysql")]
    pub driver: DriverArg,
}

/// Database drivers selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverArg {
    /// MySQL / MariaDB server
    Mysql,
    /// Embedded DuckDB file
    Duckdb,
}

/// Arguments for commands that only need a profile alias
#[derive(Args, Debug)]
pub struct AliasArgs {
    /// Profile alias
    pub alias: String,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Profile alias
    pub alias: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
