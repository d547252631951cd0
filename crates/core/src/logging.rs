//! Log output setup

use tracing_subscriber::EnvFilter;

use crate::config::VaultConfig;

/// Install a global `fmt` subscriber
///
/// `RUST_LOG` takes precedence; otherwise the level is `debug` when the
/// config enables debug output and `info` when it does not. Returns `false`
/// if a global subscriber was already installed.
pub fn init_tracing(config: &VaultConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(config)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

fn default_level(config: &VaultConfig) -> &'static str {
    if config.debug {
        "debug"
    } else {
        "info"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_follows_debug_flag() {
        let mut config = VaultConfig::default();
        assert_eq!(default_level(&config), "info");

        config.debug = true;
        assert_eq!(default_level(&config), "debug");
    }

    #[test]
    fn test_second_init_is_rejected() {
        let config = VaultConfig::default();
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
