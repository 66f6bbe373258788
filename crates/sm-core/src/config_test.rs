use super::*;
use serial_test::serial;
use tempfile::tempdir;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.url, "ws://localhost:8000");
    assert_eq!(config.base_dir, ".surreal-migrations");
    assert_eq!(config.migration_namespace, "migrations");
    assert_eq!(config.migration_database, "migrations");
    assert!(config.authentication.is_none());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
url: "http://db.internal:8000"
base_dir: "db/migrations"
migration_namespace: ops
migration_database: ledger
authentication:
  username: root
  password: secret
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.url, "http://db.internal:8000");
    assert_eq!(config.scope(), BookkeepingScope::new("ops", "ledger"));
    let auth = config.authentication.as_ref().unwrap();
    assert_eq!(auth.username, "root");
    assert_eq!(auth.password, "secret");
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("migrationDatabase: x");
    assert!(result.is_err());
}

#[test]
fn test_validate_rejects_empty_namespace() {
    let config = Config {
        migration_namespace: "  ".to_string(),
        ..Config::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
    assert!(err.to_string().contains("migration_namespace"));
}

#[test]
fn test_validate_rejects_partial_credentials() {
    let config = Config {
        authentication: Some(Authentication {
            username: "root".to_string(),
            password: String::new(),
        }),
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_save_and_load_from_dir() {
    let dir = tempdir().unwrap();
    let config = Config {
        url: "http://localhost:8001".to_string(),
        ..Config::default()
    };
    config.save(&dir.path().join(CONFIG_FILE_NAME)).unwrap();

    let loaded = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_from_dir_accepts_yaml_extension() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("surreal-migrate.yaml"),
        "base_dir: custom\n",
    )
    .unwrap();

    let loaded = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(loaded.base_dir, "custom");
}

#[test]
fn test_load_missing_config() {
    let dir = tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_malformed_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "url: [not, a, string]\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
}

#[test]
fn test_layout_relative_to_root() {
    let config = Config::default();
    let root = std::path::PathBuf::from("/tmp/project");
    assert_eq!(
        config.layout(&root).base_dir(),
        root.join(".surreal-migrations").as_path()
    );
}

#[test]
fn test_layout_absolute_base_dir() {
    let config = Config {
        base_dir: "/var/lib/migrations".to_string(),
        ..Config::default()
    };
    let layout = config.layout(std::path::Path::new("/tmp/project"));
    assert_eq!(
        layout.base_dir(),
        std::path::Path::new("/var/lib/migrations")
    );
}

#[test]
fn test_bookkeeping_scope_match() {
    let scope = BookkeepingScope::new("migrations", "migrations");
    assert!(scope.is_bookkeeping_database("migrations", "migrations"));
    assert!(!scope.is_bookkeeping_database("migrations", "app"));
    assert!(!scope.is_bookkeeping_database("app", "migrations"));
}

#[test]
#[serial]
fn test_password_env_override() {
    let config = Config {
        authentication: Some(Authentication {
            username: "root".to_string(),
            password: "from-file".to_string(),
        }),
        ..Config::default()
    };

    std::env::set_var(PASSWORD_ENV_VAR, "from-env");
    let auth = config.resolve_authentication().unwrap();
    std::env::remove_var(PASSWORD_ENV_VAR);

    assert_eq!(auth.username, "root");
    assert_eq!(auth.password, "from-env");
    assert_eq!(
        config.resolve_authentication().unwrap().password,
        "from-file"
    );
}

#[test]
#[serial]
fn test_password_env_without_username_is_ignored() {
    std::env::set_var(PASSWORD_ENV_VAR, "from-env");
    let resolved = Config::default().resolve_authentication();
    std::env::remove_var(PASSWORD_ENV_VAR);

    assert!(resolved.is_none());
}

#[test]
fn test_authentication_debug_hides_password() {
    let auth = Authentication {
        username: "root".to_string(),
        password: "hunter2".to_string(),
    };
    let debug = format!("{auth:?}");
    assert!(debug.contains("root"));
    assert!(!debug.contains("hunter2"));
}
