//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sm_core::{Config, MigrationLayout};
use sm_db::{HttpConnection, Surql};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Resolve the config file path: `--config` if given, else the default
/// name inside the project directory
pub(crate) fn config_path(global: &GlobalArgs) -> PathBuf {
    match &global.config {
        Some(path) => PathBuf::from(path),
        None => Path::new(&global.project_dir).join(sm_core::config::CONFIG_FILE_NAME),
    }
}

/// Load the project config and the migration layout it points at
pub(crate) fn load_project(global: &GlobalArgs) -> Result<(Config, MigrationLayout)> {
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(Path::new(&global.project_dir)),
    }
    .context("Failed to load surreal-migrate config")?;

    let layout = config.layout(Path::new(&global.project_dir));
    Ok((config, layout))
}

/// Open a connection, run `f`, and close the connection whatever `f` returned
pub(crate) async fn with_connection<T, F, Fut>(config: &Config, f: F) -> Result<T>
where
    F: FnOnce(Surql) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let conn = HttpConnection::from_config(config)
        .await
        .with_context(|| format!("Failed to connect to {}", config.url))?;
    let surql = Surql::new(Arc::new(conn));

    let result = f(surql.clone()).await;
    if let Err(e) = surql.close().await {
        log::warn!("Failed to close connection: {e}");
    }
    result
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
