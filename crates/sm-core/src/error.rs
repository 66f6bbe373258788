//! Error types for sm-core

use thiserror::Error;

/// Core error type for surreal-migrate
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config '{path}': {message}")]
    ConfigParseError { path: String, message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Migration directory has not been initialized
    #[error("[E004] Migrations not initialized: {path} does not exist. Run `sm init` first")]
    NotInitialized { path: String },

    /// E005: Persisted snapshot failed validation
    #[error("[E005] Invalid snapshot file '{path}': {message}")]
    SnapshotInvalid { path: String, message: String },

    /// E006: Journal file failed validation
    #[error("[E006] Invalid journal file '{path}': {message}")]
    JournalInvalid { path: String, message: String },

    /// E007: Migration name rejected
    #[error("[E007] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// E008: IO error with file path context
    #[error("[E008] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E009: YAML serialization error
    #[error("[E009] YAML error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Wrap an IO error with the path that caused it.
    pub(crate) fn io_at(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}
