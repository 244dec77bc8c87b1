//! Relay configuration
//!
//! Loads listen settings from built-in defaults, an optional `relay.toml`
//! and `RELAY_*` environment variables, in increasing precedence.

use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 19725;

/// Relay configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RelayConfig {
    /// Address the listener binds to.
    /// Environment: RELAY_BIND_ADDRESS
    pub bind_address: String,

    /// Port the listener binds to; `-p` on the command line overrides it.
    /// Environment: RELAY_PORT
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl RelayConfig {
    /// Load configuration from `relay.toml` (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("relay")
    }

    /// Load configuration using `path` as the optional file source
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("RELAY").try_parsing(true))
            .build()?;

        let config: RelayConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Address the listener binds to, as `host:port`
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = RelayConfig::load_from("does-not-exist/relay").unwrap();
        assert_eq!(config, RelayConfig::default());
        assert_eq!(config.listen_socket(), "0.0.0.0:19725");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("notify-relay-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("relay.toml");
        std::fs::write(&path, "bind_address = \"127.0.0.1\"\nport = 2500\n").unwrap();

        let config = RelayConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.listen_socket(), "127.0.0.1:2500");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_bind_address_rejected() {
        let config = RelayConfig {
            bind_address: " ".into(),
            port: 1,
        };
        assert!(config.validate().is_err());
    }
}
