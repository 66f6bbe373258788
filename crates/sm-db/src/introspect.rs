//! Live schema capture
//!
//! Walks `INFO FOR ROOT`, `INFO FOR NS`, `INFO FOR DB` and `INFO FOR TABLE`
//! to build a [`Snapshot`] of everything the connection can see, minus the
//! bookkeeping database that records applied migrations.

use crate::error::DbResult;
use crate::query::Surql;
use crate::surql;
use serde::Deserialize;
use sm_core::{
    BookkeepingScope, DatabaseSnapshot, Definitions, NamespaceSnapshot, Snapshot, TableSnapshot,
};
use std::collections::BTreeMap;

/// Result of `INFO FOR ROOT`
#[derive(Debug, Deserialize)]
pub struct RootInfo {
    #[serde(default)]
    pub namespaces: Definitions,
}

/// Result of `INFO FOR NS`
#[derive(Debug, Deserialize)]
pub struct NamespaceInfo {
    #[serde(default)]
    pub databases: Definitions,
}

/// Result of `INFO FOR DB`; `tables` maps names to table definitions
#[derive(Debug, Deserialize)]
pub struct DatabaseInfo {
    #[serde(default)]
    pub analyzers: Definitions,
    #[serde(default)]
    pub functions: Definitions,
    #[serde(default)]
    pub params: Definitions,
    #[serde(default)]
    pub tables: Definitions,
}

/// Result of `INFO FOR TABLE`
#[derive(Debug, Deserialize)]
pub struct TableInfo {
    #[serde(default)]
    pub fields: Definitions,
    #[serde(default)]
    pub indexes: Definitions,
    #[serde(default)]
    pub events: Definitions,
}

pub async fn root_info(surql: &Surql) -> DbResult<RootInfo> {
    surql
        .query("INFO FOR ROOT")
        .execute()
        .await?
        .expect_statements(1)?
        .take(0)
}

pub async fn namespace_info(surql: &Surql, ns: &str) -> DbResult<NamespaceInfo> {
    surql!(surql, "USE NS {ns}; INFO FOR NS;")
        .execute()
        .await?
        .expect_statements(2)?
        .take(1)
}

pub async fn database_info(surql: &Surql, ns: &str, db: &str) -> DbResult<DatabaseInfo> {
    surql!(surql, "USE NS {ns} DB {db}; INFO FOR DB;")
        .execute()
        .await?
        .expect_statements(2)?
        .take(1)
}

pub async fn table_info(surql: &Surql, ns: &str, db: &str, table: &str) -> DbResult<TableInfo> {
    surql!(surql, "USE NS {ns} DB {db}; INFO FOR TABLE {table};")
        .execute()
        .await?
        .expect_statements(2)?
        .take(1)
}

/// Capture the current schema of every namespace visible to `surql`
///
/// The bookkeeping database is always skipped. Its namespace is skipped too
/// unless it holds other databases.
pub async fn capture_snapshot(surql: &Surql, scope: &BookkeepingScope) -> DbResult<Snapshot> {
    let root = root_info(surql).await?;

    let mut namespaces = BTreeMap::new();
    for (ns_name, ns_create) in root.namespaces {
        let info = namespace_info(surql, &ns_name).await?;

        let mut namespace = NamespaceSnapshot::new(ns_create);
        for (db_name, db_create) in info.databases {
            if scope.is_bookkeeping_database(&ns_name, &db_name) {
                log::debug!("Skipping bookkeeping database {ns_name}/{db_name}");
                continue;
            }
            let database = capture_database(surql, &ns_name, &db_name, db_create).await?;
            namespace.databases.insert(db_name, database);
        }

        if ns_name == scope.namespace && namespace.databases.is_empty() {
            log::debug!("Skipping bookkeeping namespace {ns_name}");
            continue;
        }
        namespaces.insert(ns_name, namespace);
    }

    let snapshot = Snapshot::from_namespaces(namespaces);
    log::info!(
        "Captured {} namespace(s), {} table(s)",
        snapshot.namespaces().len(),
        snapshot.table_count()
    );
    Ok(snapshot)
}

async fn capture_database(
    surql: &Surql,
    ns: &str,
    db: &str,
    create: String,
) -> DbResult<DatabaseSnapshot> {
    let info = database_info(surql, ns, db).await?;

    let mut database = DatabaseSnapshot::new(create);
    database.analyzers = info.analyzers;
    database.functions = info.functions;
    database.params = info.params;

    for (table_name, table_create) in info.tables {
        let table = table_info(surql, ns, db, &table_name).await?;
        database.tables.insert(
            table_name,
            TableSnapshot {
                create: table_create,
                fields: table.fields,
                indexes: table.indexes,
                events: table.events,
            },
        );
    }

    Ok(database)
}

#[cfg(test)]
#[path = "introspect_test.rs"]
mod tests;
