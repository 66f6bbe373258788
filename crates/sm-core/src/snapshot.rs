//! Schema snapshots.
//!
//! A [`Snapshot`] is the full schema tree of a SurrealDB instance at one
//! point in time: namespaces, their databases, and per database the
//! analyzers, functions, params and tables (with fields, indexes and
//! events). Every leaf is the canonical `DEFINE ...` statement reported by
//! the database, so two equal leaves mean "no change".
//!
//! Snapshots are immutable values. They are built once, from a persisted
//! `meta/<NNNN>_snapshot.json` file or by introspecting a live connection,
//! and then only compared with [`Snapshot::diff`].

use crate::config::BookkeepingScope;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name → canonical definition statement
pub type Definitions = BTreeMap<String, String>;

/// Full schema tree, keyed by namespace name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    namespaces: BTreeMap<String, NamespaceSnapshot>,
}

/// One namespace and its databases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSnapshot {
    pub create: String,
    pub databases: BTreeMap<String, DatabaseSnapshot>,
}

/// One database and the objects defined in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub create: String,
    pub analyzers: Definitions,
    pub functions: Definitions,
    pub params: Definitions,
    pub tables: BTreeMap<String, TableSnapshot>,
}

/// One table and the objects defined on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub create: String,
    pub fields: Definitions,
    pub indexes: Definitions,
    pub events: Definitions,
}

impl Snapshot {
    /// The snapshot of a system with no namespaces, used before the first migration
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_namespaces(namespaces: BTreeMap<String, NamespaceSnapshot>) -> Self {
        Self { namespaces }
    }

    pub fn namespaces(&self) -> &BTreeMap<String, NamespaceSnapshot> {
        &self.namespaces
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Load and validate a persisted snapshot
    ///
    /// Any missing key or mistyped value anywhere in the tree rejects the
    /// whole file; there is no partial recovery.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io_at(path, e))?;
        serde_json::from_str(&content).map_err(|e| CoreError::SnapshotInvalid {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Persist the snapshot as pretty-printed JSON
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n").map_err(|e| CoreError::io_at(path, e))
    }

    /// Statements that turn a system in the `previous` state into `self`.
    ///
    /// See [`crate::diff::diff`].
    pub fn diff(&self, previous: &Snapshot) -> Vec<String> {
        crate::diff::diff(self, previous)
    }

    /// [`Snapshot::diff`] that never removes the namespace holding `scope`.
    pub fn diff_within(&self, previous: &Snapshot, scope: &BookkeepingScope) -> Vec<String> {
        crate::diff::diff_preserving(self, previous, Some(&scope.namespace))
    }

    /// Number of tables across all namespaces and databases
    pub fn table_count(&self) -> usize {
        self.namespaces
            .values()
            .flat_map(|ns| ns.databases.values())
            .map(|db| db.tables.len())
            .sum()
    }
}

impl NamespaceSnapshot {
    pub fn new(create: impl Into<String>) -> Self {
        Self {
            create: create.into(),
            databases: BTreeMap::new(),
        }
    }
}

impl DatabaseSnapshot {
    pub fn new(create: impl Into<String>) -> Self {
        Self {
            create: create.into(),
            analyzers: Definitions::new(),
            functions: Definitions::new(),
            params: Definitions::new(),
            tables: BTreeMap::new(),
        }
    }
}

impl TableSnapshot {
    pub fn new(create: impl Into<String>) -> Self {
        Self {
            create: create.into(),
            fields: Definitions::new(),
            indexes: Definitions::new(),
            events: Definitions::new(),
        }
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
