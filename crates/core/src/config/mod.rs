//! Configuration for the vault
//!
//! Settings are a plain serde struct stored as TOML. Missing keys take their
//! defaults, so an empty file is a valid config.
//!
//! # Example
//!
//! ```ignore
//! use vault_core::{VaultConfig, VaultContext};
//!
//! let config = VaultConfig::load(&vault_core::config::default_config_path())?;
//! let vault = VaultContext::with_config(source, config);
//! ```

mod loader;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use loader::{default_config_path, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Vault settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    /// Suffix stripped from type names when deriving document type aliases
    pub alias_suffix: String,

    /// Separator for delimited id lists and multi-value text
    pub collection_delimiter: String,

    /// Log an error when a requested node does not exist
    pub log_missing_items: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            alias_suffix: "ViewModel".to_string(),
            collection_delimiter: ",".to_string(),
            log_missing_items: true,
        }
    }
}

impl VaultConfig {
    /// The collection delimiter, falling back to `,` when configured empty
    pub fn delimiter(&self) -> &str {
        if self.collection_delimiter.is_empty() {
            ","
        } else {
            &self.collection_delimiter
        }
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from file, creating default if missing.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml_str(&content)?;
            tracing::debug!("Loaded vault config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save(path)?;
            tracing::info!("Created default vault config at {:?}", path);
            Ok(default)
        }
    }

    /// Save config to file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved vault config to {:?}", path);
        Ok(())
    }

    /// Reload config from file.
    pub fn reload(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        *self = Self::from_toml_str(&content)?;
        tracing::debug!("Reloaded vault config from {:?}", path);
        Ok(())
    }
}
