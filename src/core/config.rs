//! core::config
//!
//! Vault configuration schema and loading.
//!
//! # Overview
//!
//! Configuration lives in a single TOML file at `<vault root>/config.toml`
//! (routed through [`VaultPaths`](crate::core::paths::VaultPaths)).
//! A missing file is not an error; defaults apply. A present-but-unparsable
//! file is an error, surfaced rather than silently ignored.
//!
//! # Schema
//!
//! ```toml
//! remote_url = "https://example.com/me/notes.git"
//! auto_sync_minutes = 5
//! list_cache_ttl_secs = 3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Vault configuration.
///
/// All fields have defaults so a missing or partial file still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote repository URL. Commands that need a remote fall back to this
    /// when no URL is given on the command line.
    pub remote_url: Option<String>,

    /// Auto-sync interval in minutes. Zero disables the auto-sync driver.
    pub auto_sync_minutes: u64,

    /// TTL in seconds for the working-tree listing cache.
    pub list_cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_url: None,
            auto_sync_minutes: 0,
            list_cache_ttl_secs: 3,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// A missing file yields defaults. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write configuration to a file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: std::io::Error::other(e.to_string()),
        })?;
        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
