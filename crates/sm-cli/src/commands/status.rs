//! Status command implementation

use anyhow::Result;
use sm_core::Journal;
use sm_ledger::{status, MigrationState};

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, with_connection};

/// Execute the status command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let (config, layout) = load_project(global)?;
    layout.require_initialized()?;

    let journal = Journal::load(&layout.journal_path())?;
    let scope = config.scope();
    let (journal_ref, scope) = (&journal, &scope);

    let statuses = with_connection(&config, |surql| async move {
        Ok(status(&surql, journal_ref, scope).await?)
    })
    .await?;

    if statuses.is_empty() {
        println!("no migrations in {}", layout.journal_path().display());
        return Ok(());
    }

    for entry in &statuses {
        println!("{:<8} {}", entry.state.to_string(), entry.name);
    }

    let pending = statuses
        .iter()
        .filter(|s| s.state == MigrationState::Pending)
        .count();
    println!(
        "\n{} applied, {} pending",
        statuses.len() - pending,
        pending
    );
    Ok(())
}
