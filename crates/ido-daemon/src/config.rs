// crates/ido-daemon/src/config.rs
//
// Runtime configuration for the rewards daemon.
// Loaded from a TOML file or populated with defaults.

use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Failure to load the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data storage (RocksDB).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Storage backend: "rocksdb" or "memory".
    #[serde(default = "default_storage")]
    pub storage: String,

    /// Hex address of the pool runtime allowed to deliver notifications.
    #[serde(default)]
    pub authorized_runtime: Option<String>,

    /// Notification source: a file path, or "-" for stdin.
    #[serde(default = "default_input")]
    pub input: String,

    /// JSON-lines file that receives escrow requests. Empty means log only.
    #[serde(default)]
    pub outbox_path: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> String {
    "~/.ido/data".to_string()
}

fn default_storage() -> String {
    "rocksdb".to_string()
}

fn default_input() -> String {
    "-".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: default_storage(),
            authorized_runtime: None,
            input: default_input(),
            outbox_path: String::new(),
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
