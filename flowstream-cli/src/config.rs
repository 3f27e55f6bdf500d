//! Client configuration
//!
//! The client only needs to know:
//! - Where the wallet's JSON-RPC endpoint is
//! - Which super token to stream, and where it lives on each chain
//! - Optionally, the one chain operations may be submitted on

use alloy_primitives::address;
use flowstream::{Address, ClientSettings, TokenEntry, DEFAULT_TOKEN_SYMBOL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid wallet endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint of the wallet (EIP-1193 over HTTP). An empty
    /// string means no wallet is available and every operation fails fast.
    #[serde(default = "default_wallet_endpoint")]
    pub wallet_endpoint: Option<String>,

    /// Super token symbol operations stream.
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    /// Only submit operations while the wallet is on this chain.
    #[serde(default)]
    pub expected_chain_id: Option<u64>,

    /// App contract exposing `unwrap(address)`.
    #[serde(default = "default_super_app")]
    pub super_app: Option<Address>,

    /// How often to poll for a receipt after broadcasting, in milliseconds.
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,

    /// Known super tokens, per chain.
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenEntry>,
}

fn default_wallet_endpoint() -> Option<String> {
    // FLOWSTREAM_WALLET_ENDPOINT="http://host:port" overrides the local wallet
    Some(
        std::env::var("FLOWSTREAM_WALLET_ENDPOINT")
            .unwrap_or_else(|_| "http://127.0.0.1:1248".to_string()),
    )
}

fn default_token_symbol() -> String {
    DEFAULT_TOKEN_SYMBOL.to_string()
}

fn default_super_app() -> Option<Address> {
    Some(address!("B8879D32532FEc39df52D24d131B014bD9aFdd1c"))
}

fn default_receipt_poll_ms() -> u64 {
    2000
}

fn default_tokens() -> Vec<TokenEntry> {
    vec![TokenEntry {
        chain_id: 42,
        symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
        address: address!("5D8B4C2554aeB7e86F387B4d6c00Ac33499Ed01f"),
    }]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet_endpoint: default_wallet_endpoint(),
            token_symbol: default_token_symbol(),
            expected_chain_id: None,
            super_app: default_super_app(),
            receipt_poll_ms: default_receipt_poll_ms(),
            tokens: default_tokens(),
        }
    }
}

impl Config {
    /// Load configuration from disk, writing defaults on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            log::info!("📁 Loading config from: {}", config_path.display());
            let config = Self::load_from(&config_path)?;
            log::info!(
                "✅ Config loaded: token={}, {} known tokens",
                config.token_symbol,
                config.tokens.len()
            );
            Ok(config)
        } else {
            log::info!("📝 Creating default config");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        log::info!("💾 Config saved to: {}", path.display());
        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = Self::data_dir()?;
        path.push("config.toml");
        Ok(path)
    }

    /// Base data directory
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        path.push(".flowstream");
        Ok(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(endpoint) = self.wallet_endpoint() {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::InvalidEndpoint(endpoint));
            }
        }

        if self.token_symbol.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "token_symbol",
                reason: "must not be empty".to_string(),
            });
        }

        if self.receipt_poll_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "receipt_poll_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Configured wallet endpoint, if any, with `http://` added when no
    /// scheme is given.
    pub fn wallet_endpoint(&self) -> Option<String> {
        let endpoint = self
            .wallet_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())?;

        if endpoint.contains("://") {
            Some(endpoint.to_string())
        } else {
            Some(format!("http://{}", endpoint))
        }
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            token_symbol: self.token_symbol.clone(),
            expected_chain_id: self.expected_chain_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.token_symbol, "fDAIx");
        assert_eq!(config.expected_chain_id, None);
        assert_eq!(config.receipt_poll_interval(), Duration::from_secs(2));
        assert_eq!(
            config.tokens[0].address.to_checksum(None),
            "0x5D8B4C2554aeB7e86F387B4d6c00Ac33499Ed01f"
        );
        assert_eq!(
            config.super_app.unwrap().to_checksum(None),
            "0xB8879D32532FEc39df52D24d131B014bD9aFdd1c"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            wallet_endpoint = "http://localhost:8545"
            expected_chain_id = 5

            [[tokens]]
            chain_id = 5
            symbol = "fDAIx"
            address = "0xF2d68898557cCb2Cf4C10c3Ef2B034b2a69DAD00"
            "#,
        )
        .unwrap();

        assert_eq!(config.wallet_endpoint.as_deref(), Some("http://localhost:8545"));
        assert_eq!(config.expected_chain_id, Some(5));
        assert_eq!(config.token_symbol, "fDAIx");
        assert_eq!(config.tokens.len(), 1);
        assert_eq!(config.tokens[0].chain_id, 5);
        assert_eq!(config.client_settings().expected_chain_id, Some(5));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            token_symbol: " ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            wallet_endpoint: Some(String::new()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.wallet_endpoint(), None);

        let config = Config {
            wallet_endpoint: Some("ws://127.0.0.1:1248".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint(_))
        ));

        let config = Config {
            receipt_poll_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bare_endpoint_gets_http_scheme() {
        let config = Config {
            wallet_endpoint: Some(" 127.0.0.1:8545 ".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            config.wallet_endpoint().as_deref(),
            Some("http://127.0.0.1:8545")
        );

        let config = Config {
            wallet_endpoint: Some("https://wallet.example:8443".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.wallet_endpoint().as_deref(),
            Some("https://wallet.example:8443")
        );
    }

    #[test]
    fn test_bare_endpoint_survives_reload() {
        let dir =
            std::env::temp_dir().join(format!("flowstream-endpoint-{}", std::process::id()));
        let path = dir.join("config.toml");

        let config = Config {
            wallet_endpoint: Some("localhost:1248".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(
            loaded.wallet_endpoint().as_deref(),
            Some("http://localhost:1248")
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("flowstream-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let config = Config {
            expected_chain_id: Some(42),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded.expected_chain_id, Some(42));
        assert_eq!(loaded.tokens, config.tokens);
        assert_eq!(loaded.super_app, config.super_app);

        let _ = fs::remove_dir_all(&dir);
    }
}
