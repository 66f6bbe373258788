//! Apply command implementation - run pending migrations

use anyhow::{Context, Result};
use sm_core::Journal;
use sm_ledger::{apply_pending, ensure_layout, ensure_ledger, ScriptDirectory};

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, with_connection};

/// Execute the apply command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let (config, layout) = load_project(global)?;
    ensure_layout(&layout)?;

    let journal = Journal::load(&layout.journal_path())?;
    let source = ScriptDirectory::new(layout.clone());
    let scope = config.scope();
    let (journal, source, scope) = (&journal, &source, &scope);

    let report = with_connection(&config, |surql| async move {
        ensure_ledger(&surql, scope).await?;
        Ok(apply_pending(&surql, journal, source, scope).await?)
    })
    .await
    .context("migrations failed")?;

    match report.count() {
        0 => println!("no migrations necessary"),
        1 => println!("applied 1 migration"),
        n => println!("applied {n} migrations"),
    }
    Ok(())
}
