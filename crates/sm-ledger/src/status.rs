//! Applied/pending view of the journal.

use crate::apply::applied_migrations;
use crate::error::LedgerResult;
use sm_core::{BookkeepingScope, Journal, MigrationName};
use sm_db::Surql;
use std::collections::HashSet;
use std::fmt;

/// Where a journal entry stands against the bookkeeping table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Pending,
    Applied,
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationState::Pending => write!(f, "pending"),
            MigrationState::Applied => write!(f, "applied"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub name: MigrationName,
    pub state: MigrationState,
}

/// State of every journal entry, in journal order
///
/// Records whose name is not in the journal are logged and otherwise ignored.
pub async fn status(
    surql: &Surql,
    journal: &Journal,
    scope: &BookkeepingScope,
) -> LedgerResult<Vec<MigrationStatus>> {
    let applied: HashSet<String> = applied_migrations(surql, scope)
        .await?
        .into_iter()
        .map(|record| record.name)
        .collect();

    for name in &applied {
        if !journal.contains(name) {
            log::warn!("Applied migration {name} is not in the local journal");
        }
    }

    Ok(journal
        .iter()
        .map(|name| MigrationStatus {
            name: name.clone(),
            state: if applied.contains(name.as_str()) {
                MigrationState::Applied
            } else {
                MigrationState::Pending
            },
        })
        .collect())
}
