//! Application state shared across API handlers

use std::sync::Arc;

use lendscope_core::{AppConfig, MarketError, Network};
use market_client::MarketClient;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur while preparing shared state
#[derive(Debug, Error)]
pub enum StateError {
    /// The market API client could not be built
    #[error("Market client unavailable: {0}")]
    MarketClient(#[from] MarketError),
}

impl From<StateError> for lendscope_core::Error {
    fn from(err: StateError) -> Self {
        match err {
            StateError::MarketClient(e) => lendscope_core::Error::Market(e),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    market_client: RwLock<Option<MarketClient>>,
}

impl AppState {
    /// Create a new application state with default config
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create with a specific config
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                market_client: RwLock::new(None),
            }),
        }
    }

    /// Configuration the service was started with
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get current network
    pub fn network(&self) -> Network {
        self.inner.config.network
    }

    /// Get or create the market API client
    pub async fn market_client(&self) -> Result<MarketClient, StateError> {
        {
            let client = self.inner.market_client.read().await;
            if let Some(ref c) = *client {
                return Ok(c.clone());
            }
        }

        let mut cached = self.inner.market_client.write().await;

        // Double-check after acquiring write lock
        if let Some(ref c) = *cached {
            return Ok(c.clone());
        }

        let api_config = self.inner.config.api.clone();
        tracing::info!("Creating market client for URL: {}", api_config.url);
        let client = MarketClient::new(api_config).map_err(|e| {
            tracing::warn!("Failed to create market client: {}", e);
            e
        })?;

        *cached = Some(client.clone());
        Ok(client)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use lendscope_core::MarketApiConfig;

    use super::*;

    #[tokio::test]
    async fn test_market_client_uses_configured_api() {
        let config = AppConfig {
            api: MarketApiConfig {
                url: "http://localhost:9999".to_string(),
                timeout_secs: 5,
            },
            ..AppConfig::default()
        };
        let state = AppState::with_config(config);

        let first = state.market_client().await.unwrap();
        assert_eq!(first.config().url, "http://localhost:9999");
        assert_eq!(first.config().timeout_secs, 5);

        let cached = state.market_client().await.unwrap();
        assert_eq!(cached.config().url, first.config().url);
    }

    #[test]
    fn test_network_default() {
        assert_eq!(AppState::default().network(), Network::Mainnet);
    }
}
