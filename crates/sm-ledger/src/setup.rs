//! Bookkeeping scope setup
//!
//! The applied-migration records live in a dedicated namespace/database,
//! in a `migrations` table whose definition is checked on every run and
//! redefined when anything differs.

use crate::error::{LedgerError, LedgerResult};
use sm_core::{BookkeepingScope, MigrationLayout};
use sm_db::{database_info, namespace_info, root_info, surql, table_info, DbResult, Surql};

/// Canonical definitions reported by the server for a healthy ledger table
pub const TABLE_DEFINITION: &str = "DEFINE TABLE migrations TYPE NORMAL SCHEMAFULL PERMISSIONS NONE";
pub const ID_FIELD_DEFINITION: &str = "DEFINE FIELD id ON migrations TYPE string ASSERT string::is::ulid(record::id($value)) PERMISSIONS FULL";
pub const NAME_FIELD_DEFINITION: &str =
    "DEFINE FIELD name ON migrations TYPE string PERMISSIONS FULL";

/// Outcome of [`ensure_ledger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerSetup {
    AlreadyValid,
    Repaired,
}

/// Create the local layout when the base directory is missing
pub fn ensure_layout(layout: &MigrationLayout) -> LedgerResult<bool> {
    Ok(layout.ensure()?)
}

/// Check the bookkeeping scope and repair it in one transaction if needed
///
/// Safe to call on every invocation: a valid ledger is left untouched.
pub async fn ensure_ledger(surql: &Surql, scope: &BookkeepingScope) -> LedgerResult<LedgerSetup> {
    if ledger_is_valid(surql, scope)
        .await
        .map_err(LedgerError::Setup)?
    {
        log::debug!(
            "Migration ledger {}/{} is valid",
            scope.namespace,
            scope.database
        );
        return Ok(LedgerSetup::AlreadyValid);
    }

    let (ns, db, table) = (&scope.namespace, &scope.database, BookkeepingScope::TABLE);
    surql!(
        surql,
        "USE NS {ns} DB {db};
        DEFINE NAMESPACE IF NOT EXISTS {ns};
        DEFINE DATABASE IF NOT EXISTS {db};
        DEFINE TABLE OVERWRITE {table} SCHEMAFULL;
        DEFINE FIELD OVERWRITE id ON TABLE {table} TYPE string ASSERT string::is::ulid(record::id($value));
        DEFINE FIELD OVERWRITE name ON TABLE {table} TYPE string;"
    )
    .execute()
    .await
    .map_err(LedgerError::Setup)?;

    log::info!("Repaired migration ledger in {ns}/{db}");
    Ok(LedgerSetup::Repaired)
}

async fn ledger_is_valid(surql: &Surql, scope: &BookkeepingScope) -> DbResult<bool> {
    let (ns, db) = (scope.namespace.as_str(), scope.database.as_str());

    if !root_info(surql).await?.namespaces.contains_key(ns) {
        log::debug!("Bookkeeping namespace {ns} is missing");
        return Ok(false);
    }
    if !namespace_info(surql, ns).await?.databases.contains_key(db) {
        log::debug!("Bookkeeping database {ns}/{db} is missing");
        return Ok(false);
    }

    let tables = database_info(surql, ns, db).await?.tables;
    if tables.get(BookkeepingScope::TABLE).map(String::as_str) != Some(TABLE_DEFINITION) {
        log::debug!("Ledger table definition differs");
        return Ok(false);
    }

    let fields = table_info(surql, ns, db, BookkeepingScope::TABLE).await?.fields;
    Ok(fields.get("id").map(String::as_str) == Some(ID_FIELD_DEFINITION)
        && fields.get("name").map(String::as_str) == Some(NAME_FIELD_DEFINITION))
}
