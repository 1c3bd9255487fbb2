//! Treasury API Routes
//!
//! - POST /treasury/totals - Value the treasury's vToken balances in cents

use axum::{extract::State, routing::post, Json, Router};
use lending::{treasury_totals, TreasuryTotals};

use crate::dto::{ErrorResponse, TreasuryTotalsRequest};
use crate::routes::load_markets;
use crate::AppState;

/// Create Treasury router
pub fn router() -> Router<AppState> {
    Router::new().route("/totals", post(get_treasury_totals))
}

/// POST /treasury/totals
async fn get_treasury_totals(
    State(state): State<AppState>,
    Json(request): Json<TreasuryTotalsRequest>,
) -> Result<Json<TreasuryTotals>, ErrorResponse> {
    let markets = load_markets(&state).await?;

    let totals = treasury_totals(&markets.assets, &request.balances);
    tracing::debug!(
        balances = request.balances.len(),
        total_cents = %totals.treasury_total_balance_cents,
        "Computed treasury totals"
    );

    Ok(Json(totals))
}
