use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tasksync::config::{Config, DEFAULT_APP_ID};
use tasksync::error::ConfigError;

#[test]
fn test_partial_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "app_id = \"my-app\"\ndata_dir = \"/tmp/tasks\"\n").unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.app_id, "my-app");
    assert_eq!(config.data_dir, PathBuf::from("/tmp/tasks"));
    assert_eq!(config.custom_token, None);
    assert_eq!(config.log_level, Config::default().log_level);
    assert_eq!(config.store_file(), PathBuf::from("/tmp/tasks/store.json"));
    assert_eq!(config.auth_file(), PathBuf::from("/tmp/tasks/auth.json"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "app_id = [").unwrap();
    assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse { .. })));
}

#[test]
fn test_environment_overrides_file_values() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("TASKSYNC_APP_ID", "env-app"),
        ("TASKSYNC_TOKEN", "tok"),
        ("TASKSYNC_DATA_DIR", "/srv/tasksync"),
        ("TASKSYNC_LOG", "debug"),
        ("TASKSYNC_TOKEN_SECRET", ""),
    ]);
    let mut config = Config { app_id: "file-app".into(), ..Config::default() };
    let secret = config.token_secret.clone();
    config.apply_env(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.app_id, "env-app");
    assert_eq!(config.custom_token.as_deref(), Some("tok"));
    assert_eq!(config.data_dir, PathBuf::from("/srv/tasksync"));
    assert_eq!(config.log_level, "debug");
    // Empty values are ignored.
    assert_eq!(config.token_secret, secret);
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.app_id, DEFAULT_APP_ID);
    assert!(config.data_dir.ends_with("tasksync"));
    assert_eq!(config.log_file_name(), "tasksync.log");
}

#[test]
fn test_development_secret_detection() {
    let mut config = Config::default();
    assert!(!config.uses_development_secret());
    config.custom_token = Some("tok".into());
    assert!(config.uses_development_secret());
    config.token_secret = "real-secret".into();
    assert!(!config.uses_development_secret());
}
