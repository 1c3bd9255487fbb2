//! market-client: HTTP client for the lending market REST API
//!
//! Fetches market snapshots and market history. Responses are returned as raw
//! wire types; conversion into decimal domain types happens in the `lending` crate.
//! Caching and retries are left to the caller.

pub mod wire;

use std::time::Duration;

use lendscope_core::{MarketApiConfig, MarketError};
use serde::de::DeserializeOwned;

pub use wire::{ApiAssetSnapshot, ApiMarket, GetAssetHistoryResponse, GetMarketsResponse};

use wire::ApiEnvelope;

/// Default number of history points requested
pub const DEFAULT_HISTORY_LIMIT: u32 = 30;

/// Default history granularity
pub const DEFAULT_HISTORY_KIND: &str = "1day";

/// Result type for market client operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Market REST API client
#[derive(Clone)]
pub struct MarketClient {
    http: reqwest::Client,
    config: MarketApiConfig,
}

impl MarketClient {
    pub fn new(config: MarketApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("lendscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MarketError::Unreachable {
                url: format!("{}: {}", config.url, e),
            })?;

        Ok(Self { http, config })
    }

    /// Get the current API configuration
    pub fn config(&self) -> &MarketApiConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Fetch all markets and the protocol-wide daily reward emission
    pub async fn get_markets(&self) -> Result<GetMarketsResponse> {
        let response: GetMarketsResponse = self.get_json("/governance/venus", &[]).await?;
        tracing::debug!(markets = response.markets.len(), "Fetched markets");
        Ok(response)
    }

    /// Fetch historical snapshots for a market, newest first
    pub async fn get_asset_history(
        &self,
        vtoken_address: &str,
        kind: Option<&str>,
        limit: Option<u32>,
    ) -> Result<GetAssetHistoryResponse> {
        let kind = kind.unwrap_or(DEFAULT_HISTORY_KIND).to_string();
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

        let mut query = vec![
            ("asset", vtoken_address.to_string()),
            ("type", kind),
        ];
        if limit > 0 {
            query.push(("limit", limit.to_string()));
        }

        self.get_json("/market_history/graph", &query).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.config.url.trim_end_matches('/'), endpoint);
        let request = self.http.get(&url).query(query).send();

        let response = timed_request(self.timeout(), request)
            .await?
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Market API request failed");
                MarketError::Unreachable {
                    url: format!("{}: {}", url, e),
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MarketError::ParseError(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Market API returned error status");
            return Err(MarketError::ApiError {
                message: format!("HTTP {}: {}", status, truncate(&body, 200)),
            });
        }

        parse_envelope(&body)
    }
}

/// Unwrap the `{ status, data }` envelope, mapping `{ result: "error" }` to an API error
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: ApiEnvelope<T> =
        serde_json::from_str(body).map_err(|e| MarketError::ParseError(e.to_string()))?;

    if envelope.result.as_deref() == Some("error") || envelope.status == Some(false) {
        return Err(MarketError::ApiError {
            message: envelope
                .message
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }

    envelope
        .data
        .ok_or_else(|| MarketError::ParseError("response has no data".to_string()))
}

async fn timed_request<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = T>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| MarketError::Timeout {
            secs: timeout.as_secs(),
        })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
