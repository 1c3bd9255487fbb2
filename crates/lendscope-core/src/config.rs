//! Configuration types for Lendscope

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Network};

/// Market REST API connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketApiConfig {
    /// Base URL (e.g., "https://api.venus.io/api")
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for MarketApiConfig {
    fn default() -> Self {
        Self {
            url: "https://api.venus.io/api".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Market API settings
    #[serde(default)]
    pub api: MarketApiConfig,

    /// Network (mainnet or testnet)
    #[serde(default = "default_network")]
    pub network: Network,

    /// HTTP server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Share of the borrow limit considered safe to use, in percent
    #[serde(default = "default_safe_borrow_limit_percentage")]
    pub safe_borrow_limit_percentage: u32,

    /// Whether earnings include reward token distribution by default
    #[serde(default = "default_include_reward_token")]
    pub include_reward_token: bool,
}

fn default_network() -> Network {
    Network::Mainnet
}

fn default_api_port() -> u16 {
    19060
}

fn default_safe_borrow_limit_percentage() -> u32 {
    80
}

fn default_include_reward_token() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: MarketApiConfig::default(),
            network: default_network(),
            api_port: default_api_port(),
            safe_borrow_limit_percentage: default_safe_borrow_limit_percentage(),
            include_reward_token: default_include_reward_token(),
        }
    }
}

impl AppConfig {
    /// Load config from a JSON file, falling back to defaults when the file is absent.
    ///
    /// `LENDSCOPE_API_URL` and `LENDSCOPE_PORT` override the file values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
            Self::from_json(&raw)?
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        if let Ok(url) = std::env::var("LENDSCOPE_API_URL") {
            config.api.url = url;
        }
        if let Ok(port) = std::env::var("LENDSCOPE_PORT") {
            config.api_port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid LENDSCOPE_PORT: {}", port)))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.safe_borrow_limit_percentage > 100 {
            return Err(Error::Config(format!(
                "safe_borrow_limit_percentage must be <= 100, got {}",
                self.safe_borrow_limit_percentage
            )));
        }
        if self.api.url.is_empty() {
            return Err(Error::Config("api.url must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api.url, "https://api.venus.io/api");
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.api_port, 19060);
        assert_eq!(config.safe_borrow_limit_percentage, 80);
        assert!(config.include_reward_token);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api.url, config.api.url);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AppConfig::from_json(r#"{ "api_port": 8080 }"#).unwrap();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.safe_borrow_limit_percentage, 80);
    }

    #[test]
    fn test_invalid_safe_limit_rejected() {
        let err = AppConfig::from_json(r#"{ "safe_borrow_limit_percentage": 120 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = AppConfig::load("/nonexistent/lendscope.json");
        // Env overrides may be set in CI; only the file fallback is asserted here.
        assert!(config.is_ok());
    }
}
