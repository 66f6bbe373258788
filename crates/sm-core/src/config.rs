//! Configuration types and parsing for surreal-migrate.yml

use crate::error::{CoreError, CoreResult};
use crate::layout::MigrationLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "surreal-migrate.yml";

/// Alternate config file name accepted by [`Config::load_from_dir`].
const CONFIG_FILE_NAME_ALT: &str = "surreal-migrate.yaml";

/// Environment variable that overrides the configured password.
pub const PASSWORD_ENV_VAR: &str = "SURREAL_MIGRATE_PASSWORD";

/// Main project configuration from surreal-migrate.yml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Connection URL of the SurrealDB server (`ws://`, `wss://`, `http://` or `https://`)
    #[serde(default = "default_url")]
    pub url: String,

    /// Directory holding the journal, snapshots and migration scripts
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// Namespace holding the applied-migrations table
    #[serde(default = "default_migration_scope")]
    pub migration_namespace: String,

    /// Database holding the applied-migrations table
    #[serde(default = "default_migration_scope")]
    pub migration_database: String,

    /// Root credentials, if the server requires authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
}

/// Username/password pair used for basic authentication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Authentication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authentication")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// The reserved namespace/database/table used to record applied migrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookkeepingScope {
    pub namespace: String,
    pub database: String,
}

impl BookkeepingScope {
    /// Name of the applied-migrations table.
    pub const TABLE: &'static str = "migrations";

    pub fn new(namespace: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            database: database.into(),
        }
    }

    /// True when `namespace`/`database` is the bookkeeping database.
    pub fn is_bookkeeping_database(&self, namespace: &str, database: &str) -> bool {
        self.namespace == namespace && self.database == database
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            base_dir: default_base_dir(),
            migration_namespace: default_migration_scope(),
            migration_database: default_migration_scope(),
            authentication: None,
        }
    }
}

fn default_url() -> String {
    "ws://localhost:8000".to_string()
}

fn default_base_dir() -> String {
    ".surreal-migrations".to_string()
}

fn default_migration_scope() -> String {
    "migrations".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io_at(path, e))?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for surreal-migrate.yml or surreal-migrate.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join(CONFIG_FILE_NAME);
        let yaml_path = dir.join(CONFIG_FILE_NAME_ALT);

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Write the configuration as YAML to `path`
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        self.validate()?;
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| CoreError::io_at(path, e))
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        let required = [
            ("url", &self.url),
            ("base_dir", &self.base_dir),
            ("migration_namespace", &self.migration_namespace),
            ("migration_database", &self.migration_database),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("'{key}' cannot be empty"),
                });
            }
        }

        if let Some(auth) = &self.authentication {
            if auth.username.is_empty() || auth.password.is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "authentication requires both username and password".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Resolve the migration directory layout relative to the project root
    pub fn layout(&self, root: &Path) -> MigrationLayout {
        let base = PathBuf::from(&self.base_dir);
        if base.is_absolute() {
            MigrationLayout::new(base)
        } else {
            MigrationLayout::new(root.join(base))
        }
    }

    /// The bookkeeping scope named by this configuration
    pub fn scope(&self) -> BookkeepingScope {
        BookkeepingScope::new(&self.migration_namespace, &self.migration_database)
    }

    /// Credentials to connect with, applying the SURREAL_MIGRATE_PASSWORD override
    ///
    /// Priority: env var > configured password. The env var alone is not
    /// enough; a username must be configured.
    pub fn resolve_authentication(&self) -> Option<Authentication> {
        let auth = self.authentication.clone()?;
        match std::env::var(PASSWORD_ENV_VAR) {
            Ok(password) if !password.is_empty() => Some(Authentication {
                username: auth.username,
                password,
            }),
            _ => Some(auth),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
