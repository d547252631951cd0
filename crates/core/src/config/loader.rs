//! Config path resolution
//!
//! Resolves where the vault config file lives.

use std::path::PathBuf;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "VAULT_CONFIG";

/// File name used when no override is set
pub const DEFAULT_CONFIG_FILE: &str = "vault.toml";

/// Returns the config file path.
///
/// Uses `$VAULT_CONFIG` when set and non-empty, otherwise `./vault.toml`.
pub fn default_config_path() -> PathBuf {
    config_path_from(std::env::var(CONFIG_PATH_ENV).ok())
}

fn config_path_from(value: Option<String>) -> PathBuf {
    match value {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_path() {
        let path = config_path_from(Some("/etc/site/vault.toml".to_string()));
        assert_eq!(path, PathBuf::from("/etc/site/vault.toml"));
    }

    #[test]
    fn test_fallback_path() {
        assert_eq!(config_path_from(None), PathBuf::from("vault.toml"));
        assert_eq!(
            config_path_from(Some("  ".to_string())),
            PathBuf::from("vault.toml")
        );
    }
}
