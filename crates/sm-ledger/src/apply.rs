//! Apply pending migrations exactly once, in journal order.

use crate::error::{LedgerError, LedgerResult};
use crate::migration::{MigrationContext, MigrationSource};
use serde::Deserialize;
use sm_core::{BookkeepingScope, Journal};
use sm_db::{surql, DbResult, Surql};
use std::collections::HashSet;

/// One row of the bookkeeping table
#[derive(Debug, Clone, Deserialize)]
pub struct AppliedRecord {
    pub id: serde_json::Value,
    pub name: String,
}

/// Migrations applied by one [`apply_pending`] run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: Vec<String>,
}

impl ApplyReport {
    pub fn count(&self) -> usize {
        self.applied.len()
    }
}

/// Names already recorded in the bookkeeping table, oldest first
pub async fn applied_migrations(
    surql: &Surql,
    scope: &BookkeepingScope,
) -> DbResult<Vec<AppliedRecord>> {
    let (ns, db, table) = (&scope.namespace, &scope.database, BookkeepingScope::TABLE);
    surql!(surql, "USE NS {ns} DB {db}; SELECT * FROM {table} ORDER BY id;")
        .execute()
        .await?
        .expect_statements(2)?
        .take(1)
}

/// Run `up` for every journal entry without an applied record
///
/// Entries run one at a time; the record is written only after `up`
/// succeeds. The first failure stops the run, leaving that entry and all
/// later ones pending.
pub async fn apply_pending(
    surql: &Surql,
    journal: &Journal,
    source: &dyn MigrationSource,
    scope: &BookkeepingScope,
) -> LedgerResult<ApplyReport> {
    let applied: HashSet<String> = applied_migrations(surql, scope)
        .await?
        .into_iter()
        .map(|record| record.name)
        .collect();

    let ctx = MigrationContext::new(surql);
    let mut report = ApplyReport::default();

    for name in journal {
        if applied.contains(name.as_str()) {
            log::debug!("Skipping applied migration {name}");
            continue;
        }

        let migration = source.load(name)?;
        log::debug!("Applying migration {name}");
        migration
            .up(&ctx)
            .await
            .map_err(|err| LedgerError::MigrationFailed {
                name: name.to_string(),
                source: err,
            })?;

        record_applied(surql, scope, name.as_str())
            .await
            .map_err(|err| LedgerError::RecordFailed {
                name: name.to_string(),
                source: err,
            })?;

        log::info!("Applied migration {name}");
        report.applied.push(name.to_string());
    }

    Ok(report)
}

async fn record_applied(surql: &Surql, scope: &BookkeepingScope, name: &str) -> DbResult<()> {
    let (ns, db, table) = (&scope.namespace, &scope.database, BookkeepingScope::TABLE);
    surql!(
        surql,
        "USE NS {ns} DB {db}; CREATE {table}:ulid() SET name = $name;"
    )
    .bind("name", name)
    .execute()
    .await?;
    Ok(())
}
