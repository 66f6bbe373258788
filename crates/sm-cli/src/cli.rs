//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// surreal-migrate - schema migrations for SurrealDB
#[derive(Parser, Debug)]
#[command(name = "sm")]
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
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the config, create the migration directory and the ledger
    Init(InitArgs),

    /// Generate a migration from the live schema
    Create(CreateArgs),

    /// Apply pending migrations
    Apply,

    /// Show which migrations are applied and which are pending
    Status,
}

/// Arguments for the init command
///
/// Values given here are only used when no config file exists yet.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// SurrealDB URL
    #[arg(long)]
    pub url: Option<String>,

    /// Username for basic authentication
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Directory holding the journal, snapshots and scripts
    #[arg(long)]
    pub base_dir: Option<String>,

    /// Namespace of the applied-migrations table
    #[arg(long)]
    pub migration_namespace: Option<String>,

    /// Database of the applied-migrations table
    #[arg(long)]
    pub migration_database: Option<String>,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Migration label (default: random)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Write an empty script for hand-written statements
    #[arg(long, conflicts_with = "dry_run")]
    pub custom: bool,

    /// Print the statements without writing migration files
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
