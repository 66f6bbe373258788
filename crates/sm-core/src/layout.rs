//! On-disk layout of the migration directory.
//!
//! ```text
//! <base_dir>/
//!   0000_init.surql
//!   0001_add_email.surql
//!   meta/
//!     journal.json
//!     0000_snapshot.json
//!     0001_snapshot.json
//! ```

use crate::error::{CoreError, CoreResult};
use crate::journal::Journal;
use crate::naming::sequence_prefix;
use std::path::{Path, PathBuf};

/// Extension of migration script files.
pub const SCRIPT_EXTENSION: &str = "surql";

/// Paths of the journal, snapshot and script files under one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationLayout {
    base_dir: PathBuf,
}

impl MigrationLayout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.base_dir.join("meta")
    }

    pub fn journal_path(&self) -> PathBuf {
        self.meta_dir().join("journal.json")
    }

    /// `meta/<NNNN>_snapshot.json` for the given sequence index
    pub fn snapshot_path(&self, index: usize) -> PathBuf {
        self.meta_dir()
            .join(format!("{}_snapshot.json", sequence_prefix(index)))
    }

    /// `<full_name>.surql` for the given journal entry
    pub fn script_path(&self, full_name: &str) -> PathBuf {
        self.base_dir
            .join(format!("{full_name}.{SCRIPT_EXTENSION}"))
    }

    pub fn exists(&self) -> bool {
        self.base_dir.is_dir()
    }

    /// Fail with [`CoreError::NotInitialized`] unless the journal exists.
    pub fn require_initialized(&self) -> CoreResult<()> {
        let journal = self.journal_path();
        if journal.is_file() {
            Ok(())
        } else {
            Err(CoreError::NotInitialized {
                path: journal.display().to_string(),
            })
        }
    }

    /// Create `meta/` and an empty journal when the base directory is missing.
    ///
    /// Returns `true` when the layout was created by this call.
    pub fn ensure(&self) -> CoreResult<bool> {
        if self.exists() {
            return Ok(false);
        }
        let meta = self.meta_dir();
        std::fs::create_dir_all(&meta).map_err(|e| CoreError::io_at(&meta, e))?;
        Journal::default().save(&self.journal_path())?;
        log::debug!("Created migration layout at {}", self.base_dir.display());
        Ok(true)
    }

    /// The newest snapshot file with a sequence index below `index`.
    ///
    /// Custom migrations do not write a snapshot, so the direct predecessor
    /// may be missing; the search walks back to the closest one.
    pub fn latest_snapshot_before(&self, index: usize) -> Option<PathBuf> {
        (0..index)
            .rev()
            .map(|i| self.snapshot_path(i))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths() {
        let layout = MigrationLayout::new("/tmp/m");
        assert_eq!(layout.journal_path(), PathBuf::from("/tmp/m/meta/journal.json"));
        assert_eq!(
            layout.snapshot_path(7),
            PathBuf::from("/tmp/m/meta/0007_snapshot.json")
        );
        assert_eq!(
            layout.script_path("0007_add_email"),
            PathBuf::from("/tmp/m/0007_add_email.surql")
        );
    }

    #[test]
    fn test_ensure_creates_empty_journal_once() {
        let dir = tempdir().unwrap();
        let layout = MigrationLayout::new(dir.path().join("migrations"));

        assert!(layout.require_initialized().is_err());
        assert!(layout.ensure().unwrap());
        assert!(layout.require_initialized().is_ok());
        assert!(Journal::load(&layout.journal_path()).unwrap().is_empty());

        // Second call leaves the existing layout alone
        assert!(!layout.ensure().unwrap());
    }

    #[test]
    fn test_latest_snapshot_before_skips_gaps() {
        let dir = tempdir().unwrap();
        let layout = MigrationLayout::new(dir.path());
        std::fs::create_dir_all(layout.meta_dir()).unwrap();

        assert_eq!(layout.latest_snapshot_before(0), None);
        assert_eq!(layout.latest_snapshot_before(3), None);

        std::fs::write(layout.snapshot_path(0), "{}").unwrap();
        std::fs::write(layout.snapshot_path(1), "{}").unwrap();

        // index 2 is a custom migration without a snapshot
        assert_eq!(
            layout.latest_snapshot_before(3),
            Some(layout.snapshot_path(1))
        );
        assert_eq!(
            layout.latest_snapshot_before(1),
            Some(layout.snapshot_path(0))
        );
    }
}
