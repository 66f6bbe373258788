//! Error types for sm-db

use thiserror::Error;

/// Database operation errors
///
/// Cloneable so a memoized query outcome can hand the same failure to every
/// caller that awaits it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Submission error (D002)
    #[error("[D002] Query submission failed: {0}")]
    ExecutionError(String),

    /// A statement inside a submitted batch was rejected (D003)
    #[error("[D003] Statement {index} failed: {message}")]
    StatementFailed { index: usize, message: String },

    /// Result did not have the shape the caller declared (D004)
    #[error("[D004] Unexpected query result: {0}")]
    ResultShape(String),

    /// Connection already closed (D005)
    #[error("[D005] Connection to {0} is closed")]
    Closed(String),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            DbError::ConnectionError(err.to_string())
        } else {
            DbError::ExecutionError(err.to_string())
        }
    }
}
