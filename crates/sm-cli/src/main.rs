//! surreal-migrate CLI - schema migrations for SurrealDB

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{apply, create, init, status};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Init(args) => init::execute(args, &cli.global).await,
        cli::Commands::Create(args) => create::execute(args, &cli.global).await,
        cli::Commands::Apply => apply::execute(&cli.global).await,
        cli::Commands::Status => status::execute(&cli.global).await,
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output from our own
/// crates with `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,sm=debug,sm_core=debug,sm_db=debug,sm_ledger=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
