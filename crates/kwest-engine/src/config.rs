//! Configuration via `kwest.toml`
//!
//! Every field is optional. A missing file means defaults; a default file
//! with comments can be written next to the data with
//! `write_default_if_missing`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use kwest_core::{Error, Result, DEFAULT_LOCAL_KEY, DEFAULT_NAMESPACE};
use kwest_storage::{DirCacheStore, FileBackend};

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "kwest.toml";

/// Store configuration loaded from `kwest.toml`.
///
/// # Example
///
/// ```toml
/// namespace = "Kwest-Journal"
/// local_key = "global"
/// clear_on_init = false
/// state_file = "state.json"
/// cache_dir = "caches"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KwestConfig {
    /// Prefix of every storage key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Store selected when none is named.
    #[serde(default = "default_local_key")]
    pub local_key: String,
    /// Wipe the namespace every time a store opens.
    #[serde(default)]
    pub clear_on_init: bool,
    /// Key-value file, relative to the data directory.
    #[serde(default = "default_state_file")]
    pub state_file: String,
    /// Cache directory, relative to the data directory.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_local_key() -> String {
    DEFAULT_LOCAL_KEY.to_string()
}

fn default_state_file() -> String {
    "state.json".to_string()
}

fn default_cache_dir() -> String {
    "caches".to_string()
}

impl Default for KwestConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            local_key: default_local_key(),
            clear_on_init: false,
            state_file: default_state_file(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl KwestConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# kwest configuration
#
# Prefix for every storage key ("<namespace>.<local_key>").
namespace = "Kwest-Journal"

# Store used when no local key is given.
local_key = "global"

# Wipe every key in the namespace whenever a store opens (default: false).
clear_on_init = false

# Key-value file and cache directory, relative to the data directory.
state_file = "state.json"
cache_dir = "caches"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// namespace is empty.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: KwestConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `kwest.toml` from `dir`, or defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values that would make keys ambiguous.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is empty or contains a `.`.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() || self.namespace.contains('.') {
            return Err(Error::config(format!(
                "Invalid namespace '{}': must be non-empty and contain no '.'",
                self.namespace
            )));
        }
        Ok(())
    }

    /// Write the default config file if it does not already exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Open the file backend under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but cannot be loaded.
    pub fn open_backend(&self, dir: &Path) -> Result<FileBackend> {
        FileBackend::open(dir.join(&self.state_file))
    }

    /// Cache store under `dir`.
    pub fn cache_store(&self, dir: &Path) -> DirCacheStore {
        DirCacheStore::new(dir.join(&self.cache_dir))
    }
}
