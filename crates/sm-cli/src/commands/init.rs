//! Init command implementation - writes the config and prepares the ledger

use anyhow::{Context, Result};
use sm_core::{Authentication, Config};
use sm_ledger::{ensure_layout, ensure_ledger, LedgerSetup};
use std::path::Path;

use crate::cli::{GlobalArgs, InitArgs};
use crate::commands::common::{config_path, with_connection};

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let path = config_path(global);
    let existing = path.exists();
    let config = if existing {
        Config::load(&path).context("Failed to load existing config")?
    } else {
        config_from_args(args)
    };

    let layout = config.layout(Path::new(&global.project_dir));
    if layout.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Migrations are already initialized.",
            layout.base_dir().display()
        );
    }

    if existing {
        println!("Using existing config {}", path.display());
    } else {
        config
            .save(&path)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        println!("Wrote config {}", path.display());
    }

    ensure_layout(&layout)?;
    let scope = config.scope();
    let scope = &scope;
    let setup = with_connection(&config, |surql| async move {
        Ok(ensure_ledger(&surql, scope).await?)
    })
    .await;

    match setup {
        Ok(setup) => {
            if setup == LedgerSetup::Repaired {
                println!(
                    "Created migration ledger in {}/{}",
                    scope.namespace, scope.database
                );
            }
            println!("Initialized {}", layout.base_dir().display());
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = std::fs::remove_dir_all(layout.base_dir()) {
                log::warn!(
                    "Failed to remove {}: {cleanup}",
                    layout.base_dir().display()
                );
            }
            Err(e.context("Failed to initialize migrations"))
        }
    }
}

/// Defaults overlaid with whatever was given on the command line
fn config_from_args(args: &InitArgs) -> Config {
    let mut config = Config::default();
    if let Some(url) = &args.url {
        config.url = url.clone();
    }
    if let Some(base_dir) = &args.base_dir {
        config.base_dir = base_dir.clone();
    }
    if let Some(ns) = &args.migration_namespace {
        config.migration_namespace = ns.clone();
    }
    if let Some(db) = &args.migration_database {
        config.migration_database = db.clone();
    }
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        config.authentication = Some(Authentication {
            username: username.clone(),
            password: password.clone(),
        });
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> InitArgs {
        InitArgs {
            url: None,
            username: None,
            password: None,
            base_dir: None,
            migration_namespace: None,
            migration_database: None,
        }
    }

    #[test]
    fn test_config_from_args_defaults() {
        assert_eq!(config_from_args(&args()), Config::default());
    }

    #[test]
    fn test_config_from_args_overrides() {
        let config = config_from_args(&InitArgs {
            url: Some("http://db:8000".to_string()),
            username: Some("root".to_string()),
            password: Some("secret".to_string()),
            base_dir: Some("schema".to_string()),
            ..args()
        });
        assert_eq!(config.url, "http://db:8000");
        assert_eq!(config.base_dir, "schema");
        assert_eq!(config.migration_namespace, "migrations");
        let auth = config.authentication.unwrap();
        assert_eq!(auth.username, "root");
        assert_eq!(auth.password, "secret");
    }

    #[test]
    fn test_config_from_args_needs_both_credentials() {
        let config = config_from_args(&InitArgs {
            username: Some("root".to_string()),
            ..args()
        });
        assert!(config.authentication.is_none());
        assert!(config.validate().is_ok());
    }
}
