//! Account API Routes
//!
//! Account balances are read by the wallet layer and posted here; the
//! service combines them with live market data.
//!
//! - POST /account/summary - Per-market positions and dashboard totals
//! - POST /account/preview - Effect of a pending supply/withdraw/borrow/repay

use axum::{extract::State, routing::post, Json, Router};
use bigdecimal::BigDecimal;
use lendscope_core::{AppConfig, CalcError, TokenId};
use lending::{
    build_user_assets, max_borrow_tokens, max_repay_tokens, max_withdraw_tokens, preview,
    summarize, MarketsData, PendingAction,
};

use crate::dto::{
    error_response, AccountSummaryRequest, AccountSummaryResponse, ErrorResponse,
    PreviewRequest, PreviewResponse,
};
use crate::routes::load_markets;
use crate::AppState;

/// Create Account router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", post(account_summary))
        .route("/preview", post(account_preview))
}

/// POST /account/summary
async fn account_summary(
    State(state): State<AppState>,
    Json(request): Json<AccountSummaryRequest>,
) -> Result<Json<AccountSummaryResponse>, ErrorResponse> {
    let config = state.config().clone();
    let markets = load_markets(&state).await?;

    build_summary(&markets, &request, &config)
        .map(Json)
        .map_err(error_response)
}

/// POST /account/preview
async fn account_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ErrorResponse> {
    let config = state.config().clone();
    let markets = load_markets(&state).await?;

    tracing::debug!(
        token = %request.token,
        action = request.action.as_str(),
        amount = %request.amount_tokens,
        "Previewing pending action"
    );

    build_preview(&markets, &request, &config)
        .map(Json)
        .map_err(error_response)
}

fn build_summary(
    markets: &MarketsData,
    request: &AccountSummaryRequest,
    config: &AppConfig,
) -> Result<AccountSummaryResponse, CalcError> {
    let include_reward_token = request
        .include_reward_token
        .unwrap_or(config.include_reward_token);

    let user_assets = build_user_assets(markets, &request.account)?;
    let summary = summarize(
        &user_assets,
        include_reward_token,
        config.safe_borrow_limit_percentage,
    );

    Ok(AccountSummaryResponse {
        user_assets,
        summary,
    })
}

fn build_preview(
    markets: &MarketsData,
    request: &PreviewRequest,
    config: &AppConfig,
) -> Result<PreviewResponse, CalcError> {
    let include_reward_token = request
        .include_reward_token
        .unwrap_or(config.include_reward_token);
    let safe_percentage = config.safe_borrow_limit_percentage;
    // Request bodies are not normalized on deserialize
    let token = TokenId::new(request.token.as_str());

    let user_assets = build_user_assets(markets, &request.account)?;
    let asset = user_assets
        .find(&token)
        .ok_or_else(|| CalcError::UnknownAsset {
            token: token.to_string(),
        })?;

    let max_amount_tokens: BigDecimal = match request.action {
        PendingAction::Supply => asset.wallet_balance_tokens.clone(),
        PendingAction::Withdraw => max_withdraw_tokens(&user_assets, &token, safe_percentage)?,
        PendingAction::Borrow => max_borrow_tokens(&user_assets, &token, safe_percentage)?,
        PendingAction::Repay => max_repay_tokens(asset),
    };

    let preview = preview(
        &user_assets,
        &token,
        request.action,
        &request.amount_tokens,
        include_reward_token,
    )?;

    Ok(PreviewResponse {
        preview,
        max_amount_tokens,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use lending::Asset;
    use num_bigint::BigInt;
    use num_traits::Zero;
    use tower::ServiceExt;

    use super::*;
    use crate::create_app;

    const VUSDC: &str = "0xeca88125a5adbe82614ffc12d0db554e2e2867c8";

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn usdc_market() -> MarketsData {
        let asset = Asset {
            id: TokenId::new("usdc"),
            name: "Venus USDC".to_string(),
            symbol: "vUSDC".to_string(),
            vtoken_address: VUSDC.to_string(),
            underlying_address: None,
            decimals: 18,
            token_price_dollars: dec("1"),
            supply_apy: 5.0,
            borrow_apy: -10.0,
            reward_supply_apr: 0.0,
            reward_supply_apy: 0.0,
            reward_borrow_apr: 0.0,
            reward_borrow_apy: 0.0,
            collateral_factor: dec("0.8"),
            reserve_factor: dec("0.2"),
            exchange_rate: dec("200000000000000000000000000"),
            supply_rate_per_block: dec("1000000000"),
            borrow_rate_per_block: dec("3000000000"),
            borrow_cap_tokens: BigDecimal::zero(),
            liquidity_cents: dec("100000000"),
            total_supply_wei: BigInt::zero(),
            total_supply_tokens: dec("2000000"),
            total_supply_cents: dec("200000000"),
            total_borrows_wei: BigInt::zero(),
            total_borrows_tokens: dec("800000"),
            total_borrows_cents: dec("80000000"),
            total_reserves_wei: BigInt::zero(),
            supply_daily_reward_wei: BigInt::zero(),
            borrow_daily_reward_wei: BigInt::zero(),
            total_reward_distributed_wei: BigInt::zero(),
            supplier_count: 1,
            borrower_count: 1,
        };

        MarketsData {
            assets: vec![asset],
            daily_reward_wei: BigInt::zero(),
        }
    }

    // 100 USDC in the wallet, 1000 supplied as collateral, 200 borrowed
    fn account_json() -> serde_json::Value {
        serde_json::json!({
            "collateral_vtokens": [VUSDC],
            "balances": [{
                "vtoken": VUSDC,
                "token_balance": "100000000000000000000",
                "balance_of_underlying": "1000000000000000000000",
                "borrow_balance_current": "200000000000000000000"
            }]
        })
    }

    fn preview_request(action: &str, amount: &str) -> PreviewRequest {
        let mut body = account_json();
        body["token"] = serde_json::json!("USDC");
        body["action"] = serde_json::json!(action);
        body["amount_tokens"] = serde_json::json!(amount);
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_build_summary_uses_config_defaults() {
        let request: AccountSummaryRequest = serde_json::from_value(account_json()).unwrap();
        let response = build_summary(&usdc_market(), &request, &AppConfig::default()).unwrap();

        assert_eq!(response.summary.total_supply_cents, dec("100000"));
        assert_eq!(response.summary.total_borrow_cents, dec("20000"));
        assert_eq!(response.summary.borrow_limit_cents, dec("80000"));
        assert_eq!(response.summary.safe_borrow_limit_percentage, 80.0);
        assert_eq!(response.user_assets.assets[0].percent_of_limit, 25);
    }

    #[test]
    fn test_build_preview_max_amounts() {
        let markets = usdc_market();
        let config = AppConfig::default();

        let supply = build_preview(&markets, &preview_request("supply", "10"), &config).unwrap();
        assert_eq!(supply.max_amount_tokens, dec("100"));

        let repay = build_preview(&markets, &preview_request("repay", "10"), &config).unwrap();
        assert_eq!(repay.max_amount_tokens, dec("100"));

        // Safe limit is $640 of the $800 limit; $200 is already borrowed
        let borrow = build_preview(&markets, &preview_request("borrow", "10"), &config).unwrap();
        assert_eq!(borrow.max_amount_tokens, dec("440"));
        assert_eq!(borrow.preview.token.as_str(), "usdc");
    }

    #[test]
    fn test_build_preview_rejects_overdraw() {
        let err = build_preview(
            &usdc_market(),
            &preview_request("supply", "101"),
            &AppConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "insufficient_balance");
    }

    #[test]
    fn test_build_preview_unknown_asset() {
        let mut request = preview_request("supply", "1");
        request.token = TokenId::new("busd");
        let err = build_preview(&usdc_market(), &request, &AppConfig::default()).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_malformed_preview_body_is_rejected() {
        let app = create_app(AppState::new());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/account/preview")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"token": "usdc", "action": "stake"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
