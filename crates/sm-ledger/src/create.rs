//! Generate a migration from the difference between the live schema and the
//! last recorded snapshot.

use crate::error::LedgerResult;
use crate::migration::render_script;
use crate::setup::ensure_ledger;
use sm_core::{BookkeepingScope, CoreError, Journal, MigrationLayout, MigrationName, Snapshot};
use sm_db::{capture_snapshot, Surql};

/// Forward and inverse statements between two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub up: Vec<String>,
    pub down: Vec<String>,
}

/// A migration written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMigration {
    pub name: MigrationName,
    pub plan: MigrationPlan,
}

/// Plan the migration from `previous` to `live`, or `None` if nothing changed
///
/// Neither direction ever removes the namespace holding the ledger.
pub fn plan_migration(
    live: &Snapshot,
    previous: &Snapshot,
    scope: &BookkeepingScope,
) -> Option<MigrationPlan> {
    let up = live.diff_within(previous, scope);
    if up.is_empty() {
        return None;
    }
    Some(MigrationPlan {
        up,
        down: previous.diff_within(live, scope),
    })
}

/// The snapshot a new migration at `index` is diffed against
pub fn previous_snapshot(layout: &MigrationLayout, index: usize) -> LedgerResult<Snapshot> {
    match layout.latest_snapshot_before(index) {
        Some(path) => {
            log::debug!("Diffing against {}", path.display());
            Ok(Snapshot::from_file(&path)?)
        }
        None => Ok(Snapshot::empty()),
    }
}

/// Capture the live schema and plan against the last snapshot, writing no
/// local files
///
/// The ledger is checked and repaired first, as for every remote run.
pub async fn plan_pending(
    surql: &Surql,
    layout: &MigrationLayout,
    scope: &BookkeepingScope,
) -> LedgerResult<Option<MigrationPlan>> {
    let journal = Journal::load(&layout.journal_path())?;
    let previous = previous_snapshot(layout, journal.next_index())?;
    ensure_ledger(surql, scope).await?;
    let live = capture_snapshot(surql, scope).await?;
    Ok(plan_migration(&live, &previous, scope))
}

/// Diff and record: snapshot, journal entry and script for the changes made
/// since the last migration
///
/// The ledger is checked and repaired before the live schema is captured.
/// Returns `None` and writes nothing when the live schema matches.
pub async fn create_migration(
    surql: &Surql,
    layout: &MigrationLayout,
    scope: &BookkeepingScope,
    label: &str,
) -> LedgerResult<Option<CreatedMigration>> {
    layout.require_initialized()?;
    let mut journal = Journal::load(&layout.journal_path())?;
    let index = journal.next_index();
    let name = MigrationName::compose(index, label)?;

    let previous = previous_snapshot(layout, index)?;
    ensure_ledger(surql, scope).await?;
    let live = capture_snapshot(surql, scope).await?;
    let Some(plan) = plan_migration(&live, &previous, scope) else {
        log::debug!("Live schema matches snapshot, nothing to record");
        return Ok(None);
    };

    live.save(&layout.snapshot_path(index))?;
    journal.append(name.clone());
    journal.save(&layout.journal_path())?;
    write_script(layout, &name, &render_script(&plan.up, &plan.down))?;

    log::info!(
        "Created migration {name} ({} up, {} down statement(s))",
        plan.up.len(),
        plan.down.len()
    );
    Ok(Some(CreatedMigration { name, plan }))
}

/// Journal entry plus an empty script scaffold, for hand-written migrations
///
/// No snapshot is written; the next generated migration diffs against the
/// most recent snapshot that exists.
pub fn create_custom_migration(layout: &MigrationLayout, label: &str) -> LedgerResult<MigrationName> {
    layout.require_initialized()?;
    let mut journal = Journal::load(&layout.journal_path())?;
    let name = MigrationName::compose(journal.next_index(), label)?;

    write_script(layout, &name, &render_script(&[], &[]))?;
    journal.append(name.clone());
    journal.save(&layout.journal_path())?;

    log::info!("Created custom migration {name}");
    Ok(name)
}

fn write_script(layout: &MigrationLayout, name: &MigrationName, script: &str) -> LedgerResult<()> {
    let path = layout.script_path(name.as_str());
    std::fs::write(&path, script).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
