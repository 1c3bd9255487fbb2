//! API route handlers

pub mod account;
pub mod health;
pub mod markets;
pub mod treasury;

use axum::{routing::get, Router};
use lending::MarketsData;

use crate::dto::{error_response, ErrorResponse};
use crate::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/markets", markets::router())
        .nest("/account", account::router())
        .nest("/treasury", treasury::router())
        .with_state(state)
}

/// Fetch and format every listed market
pub(crate) async fn load_markets(state: &AppState) -> Result<MarketsData, ErrorResponse> {
    let client = state.market_client().await.map_err(error_response)?;
    lending::fetch_assets(&client).await.map_err(error_response)
}
