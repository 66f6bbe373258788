//! The migration journal: the ordered list of migrations that exist.
//!
//! Sequence position is the authoritative application order. The journal is
//! append-only; whether an entry has run is tracked remotely, not here.

use crate::error::{CoreError, CoreResult};
use crate::naming::MigrationName;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of `meta/journal.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    migrations: Vec<MigrationName>,
}

impl Journal {
    /// Load the journal from `path`
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::NotInitialized {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io_at(path, e))?;
        let journal: Journal =
            serde_json::from_str(&content).map_err(|e| CoreError::JournalInvalid {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        journal.check_order(path)?;
        Ok(journal)
    }

    /// Write the journal to `path`
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n").map_err(|e| CoreError::io_at(path, e))
    }

    /// Sequence index the next migration will receive
    pub fn next_index(&self) -> usize {
        self.migrations.len()
    }

    /// Append a migration at the end of the journal
    pub fn append(&mut self, name: MigrationName) {
        self.migrations.push(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.migrations.iter().any(|m| m == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MigrationName> {
        self.migrations.iter()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Every entry must carry the prefix of its own position.
    fn check_order(&self, path: &Path) -> CoreResult<()> {
        for (index, name) in self.migrations.iter().enumerate() {
            if name.sequence() != index {
                return Err(CoreError::JournalInvalid {
                    path: path.display().to_string(),
                    message: format!("entry '{name}' is at position {index}"),
                });
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Journal {
    type Item = &'a MigrationName;
    type IntoIter = std::slice::Iter<'a, MigrationName>;

    fn into_iter(self) -> Self::IntoIter {
        self.migrations.iter()
    }
}

#[cfg(test)]
#[path = "journal_test.rs"]
mod tests;
