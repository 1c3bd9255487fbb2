//! Market API Routes
//!
//! - GET /markets - Every listed market with protocol totals
//! - GET /markets/:token - One market with derived detail figures
//! - GET /markets/:token/history - Daily supply/borrow chart of one market

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use lendscope_core::{MarketError, TokenId};
use lending::{chart_data, constants, market_totals, units, MarketDetail, MarketsData};
use num_bigint::BigInt;

use crate::dto::{
    error_response, ErrorResponse, MarketDetailQuery, MarketDetailResponse,
    MarketHistoryResponse, MarketsResponse,
};
use crate::routes::load_markets;
use crate::AppState;

/// Create Markets router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_markets))
        .route("/:token", get(get_market))
        .route("/:token/history", get(get_market_history))
}

/// GET /markets - All listed markets
async fn get_markets(State(state): State<AppState>) -> Result<Json<MarketsResponse>, ErrorResponse> {
    let markets = load_markets(&state).await?;

    Ok(Json(MarketsResponse {
        totals: market_totals(&markets.assets),
        daily_reward_wei: markets.daily_reward_wei.to_string(),
        assets: markets.assets,
    }))
}

/// GET /markets/:token - Single market details
async fn get_market(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<MarketDetailQuery>,
) -> Result<Json<MarketDetailResponse>, ErrorResponse> {
    let token = listed_token(&token)?;
    let cash_wei = query
        .cash_wei
        .as_deref()
        .map(units::parse_wei)
        .transpose()
        .map_err(error_response)?;

    let markets = load_markets(&state).await?;
    Ok(Json(market_detail(&markets, &token, cash_wei.as_ref())?))
}

/// GET /markets/:token/history - Chart points, oldest first
async fn get_market_history(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MarketHistoryResponse>, ErrorResponse> {
    let token = listed_token(&token)?;
    let client = state.market_client().await.map_err(error_response)?;

    let snapshots = lending::fetch_asset_history(&client, &token)
        .await
        .map_err(error_response)?;

    Ok(Json(MarketHistoryResponse {
        chart: chart_data(&snapshots),
        token,
    }))
}

/// Reject tokens without a market before any network round trip
fn listed_token(raw: &str) -> Result<TokenId, ErrorResponse> {
    let token = TokenId::new(raw);
    if constants::vtoken(token.as_str()).is_none() {
        return Err(error_response(MarketError::UnknownToken {
            token: token.to_string(),
        }));
    }
    Ok(token)
}

fn market_detail(
    markets: &MarketsData,
    token: &TokenId,
    cash_wei: Option<&BigInt>,
) -> Result<MarketDetailResponse, ErrorResponse> {
    let asset = markets.find(token).ok_or_else(|| {
        error_response(MarketError::MarketNotFound {
            token: token.to_string(),
        })
    })?;

    Ok(MarketDetailResponse {
        detail: MarketDetail::from_asset(asset, cash_wei),
        asset: asset.clone(),
    })
}
