//! Runtime configuration.
//!
//! Values are resolved in this order, later sources winning:
//! 1. Built-in defaults.
//! 2. A TOML file: `--config <path>`, otherwise `<config dir>/tasksync/config.toml` if it exists.
//! 3. `TASKSYNC_*` environment variables.
//! 4. Command-line flags (applied by the binary).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_APP_ID: &str = "default-app-id";
const DEFAULT_TOKEN_SECRET: &str = "tasksync-dev-secret";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application identifier, the `{appId}` segment of collection paths.
    pub app_id: String,
    /// Custom token used to sign in when no identity is stored yet.
    pub custom_token: Option<String>,
    /// Secret custom tokens are signed with.
    pub token_secret: String,
    /// Directory holding the store, the auth state and the TUI log.
    pub data_dir: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app_id: DEFAULT_APP_ID.to_string(),
            custom_token: None,
            token_secret: DEFAULT_TOKEN_SECRET.to_string(),
            data_dir: default_data_dir(),
            log_level: "info".to_string(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("tasksync");
    p
}

/// `<config dir>/tasksync/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tasksync").join("config.toml"))
}

impl Config {
    /// Parses a TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads the file layer and the environment layer.
    ///
    /// An explicit path must exist; the default path is optional. Nothing is
    /// logged here since this runs before the subscriber is installed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Config::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Config::from_file(&path)?,
                _ => Config::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// True when custom tokens would be checked against the built-in secret.
    pub fn uses_development_secret(&self) -> bool {
        self.custom_token.is_some() && self.token_secret == DEFAULT_TOKEN_SECRET
    }

    /// Applies `TASKSYNC_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TASKSYNC_APP_ID").filter(|v| !v.is_empty()) {
            self.app_id = v;
        }
        if let Some(v) = lookup("TASKSYNC_TOKEN").filter(|v| !v.is_empty()) {
            self.custom_token = Some(v);
        }
        if let Some(v) = lookup("TASKSYNC_TOKEN_SECRET").filter(|v| !v.is_empty()) {
            self.token_secret = v;
        }
        if let Some(v) = lookup("TASKSYNC_DATA_DIR").filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("TASKSYNC_LOG").filter(|v| !v.is_empty()) {
            self.log_level = v;
        }
    }

    pub fn store_file(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }

    pub fn auth_file(&self) -> PathBuf {
        self.data_dir.join("auth.json")
    }

    pub fn log_file_name(&self) -> &'static str {
        "tasksync.log"
    }
}
