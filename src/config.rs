//! Application configuration
//!
//! Settings come from an optional TOML file layered over built-in defaults,
//! then from `ASK_E9Y_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::store::MAX_HISTORY_ITEMS;

pub const ENV_API_URL: &str = "ASK_E9Y_API_URL";
pub const ENV_APP_ENV: &str = "ASK_E9Y_APP_ENV";
pub const ENV_DATA_DIR: &str = "ASK_E9Y_DATA_DIR";

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the query API
    pub api_url: String,
    /// Deployment environment name
    pub app_env: String,
    /// Directory holding the record store
    pub data_dir: PathBuf,
    /// Number of history items kept
    pub max_history: usize,
}

/// TOML structure for deserializing configuration
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    api_url: Option<String>,
    app_env: Option<String>,
    data_dir: Option<PathBuf>,
    max_history: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            app_env: "development".to_string(),
            data_dir: PathBuf::from(".ask-e9y"),
            max_history: MAX_HISTORY_ITEMS,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        Ok(Config {
            api_url: parsed.api_url.unwrap_or(defaults.api_url),
            app_env: parsed.app_env.unwrap_or(defaults.app_env),
            data_dir: parsed.data_dir.unwrap_or(defaults.data_dir),
            max_history: parsed.max_history.unwrap_or(defaults.max_history),
        })
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides looked up by environment variable name
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(env) = lookup(ENV_APP_ENV) {
            self.app_env = env;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }
}
