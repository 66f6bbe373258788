//! Error types for sm-ledger

use sm_core::CoreError;
use sm_db::DbError;
use thiserror::Error;

/// Ledger and migration flow errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Bookkeeping scope could not be checked or repaired (L001)
    #[error("[L001] Migration ledger setup failed")]
    Setup(#[source] DbError),

    /// A migration unit is missing or malformed (L002)
    #[error("[L002] Invalid migration '{name}': {reason}")]
    InvalidMigration { name: String, reason: String },

    /// A migration's up procedure failed; it was not recorded (L003)
    #[error("[L003] Migration '{name}' failed")]
    MigrationFailed { name: String, source: DbError },

    /// The up procedure succeeded but the applied record could not be written (L004)
    #[error("[L004] Migration '{name}' ran but could not be recorded")]
    RecordFailed { name: String, source: DbError },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type alias for LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Name of the migration involved, if any
    pub fn migration_name(&self) -> Option<&str> {
        match self {
            LedgerError::InvalidMigration { name, .. }
            | LedgerError::MigrationFailed { name, .. }
            | LedgerError::RecordFailed { name, .. } => Some(name),
            _ => None,
        }
    }
}
