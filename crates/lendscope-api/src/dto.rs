//! Data Transfer Objects for API requests and responses

use axum::{http::StatusCode, Json};
use bigdecimal::BigDecimal;
use lendscope_core::{Error, TokenId};
use lending::{
    AccountSnapshot, Asset, ChartData, MarketDetail, MarketTotals, PendingAction,
    PortfolioSummary, PositionPreview, UserAssets, VTokenBalance,
};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// GET /markets
#[derive(Debug, Clone, Serialize)]
pub struct MarketsResponse {
    pub assets: Vec<Asset>,
    pub totals: MarketTotals,
    /// Protocol-wide daily reward emission in wei
    pub daily_reward_wei: String,
}

/// Query of GET /markets/:token
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketDetailQuery {
    /// Market cash in wei, needed for the utilization rate
    pub cash_wei: Option<String>,
}

/// GET /markets/:token
#[derive(Debug, Clone, Serialize)]
pub struct MarketDetailResponse {
    pub asset: Asset,
    pub detail: MarketDetail,
}

/// GET /markets/:token/history
#[derive(Debug, Clone, Serialize)]
pub struct MarketHistoryResponse {
    pub token: TokenId,
    pub chart: ChartData,
}

/// POST /account/summary
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSummaryRequest {
    #[serde(flatten)]
    pub account: AccountSnapshot,
    /// Falls back to the configured default
    #[serde(default)]
    pub include_reward_token: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountSummaryResponse {
    pub user_assets: UserAssets,
    pub summary: PortfolioSummary,
}

/// POST /account/preview
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewRequest {
    #[serde(flatten)]
    pub account: AccountSnapshot,
    pub token: TokenId,
    pub action: PendingAction,
    #[serde(deserialize_with = "lending::units::deserialize_decimal")]
    pub amount_tokens: BigDecimal,
    #[serde(default)]
    pub include_reward_token: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewResponse {
    pub preview: PositionPreview,
    /// Largest amount the form accepts for this action
    pub max_amount_tokens: BigDecimal,
}

/// POST /treasury/totals
#[derive(Debug, Clone, Deserialize)]
pub struct TreasuryTotalsRequest {
    pub balances: Vec<VTokenBalance>,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Error half of every handler result
pub type ErrorResponse = (StatusCode, Json<ApiError>);

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::new(err.error_code(), err.to_string())
    }
}

/// Map a core error onto its HTTP status and JSON body
pub fn error_response(err: impl Into<Error>) -> ErrorResponse {
    let err = err.into();
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::warn!(code = err.error_code(), error = %err, "Request failed");
    }
    (status, Json(ApiError::from(err)))
}
