//! Lending State Fetching from the market API
//!
//! Converts raw market API responses into decimal domain types.

use bigdecimal::BigDecimal;
use chrono::DateTime;
use lendscope_core::{CalcError, MarketError, TokenId};
use market_client::{ApiAssetSnapshot, ApiMarket, MarketClient};
use num_bigint::BigInt;
use num_traits::{One, Signed};

use crate::constants::{self, protocol};
use crate::state::{Asset, AssetSnapshot, MarketsData};
use crate::units::{dollars_to_cents, parse_decimal, parse_rate, parse_wei};

/// Fetch every listed market and the protocol-wide daily reward emission
pub async fn fetch_assets(client: &MarketClient) -> lendscope_core::Result<MarketsData> {
    let response = client.get_markets().await?;
    let daily_reward_wei = parse_wei(&response.daily_venus)?;

    let assets: Vec<Asset> = response.markets.iter().filter_map(format_market).collect();

    tracing::debug!(
        received = response.markets.len(),
        listed = assets.len(),
        "Formatted markets"
    );

    Ok(MarketsData {
        assets,
        daily_reward_wei,
    })
}

/// Fetch daily snapshots of one market, newest first
pub async fn fetch_asset_history(
    client: &MarketClient,
    token: &TokenId,
) -> lendscope_core::Result<Vec<AssetSnapshot>> {
    let vtoken = constants::vtoken(token.as_str()).ok_or_else(|| MarketError::UnknownToken {
        token: token.to_string(),
    })?;

    let response = client.get_asset_history(vtoken.address, None, None).await?;

    let snapshots = response
        .result
        .iter()
        .map(format_snapshot)
        .collect::<lendscope_core::Result<Vec<_>>>()?;

    tracing::debug!(token = %token, points = snapshots.len(), "Fetched market history");
    Ok(snapshots)
}

/// Convert an API market into an [`Asset`].
///
/// Returns `None` for markets whose underlying token is not in the static
/// token table, and for markets with malformed numbers (logged).
pub fn format_market(market: &ApiMarket) -> Option<Asset> {
    let id = market.underlying_symbol.to_lowercase();
    let token = constants::token(&id)?;
    constants::vtoken(&id)?;

    match try_format_market(market, token) {
        Ok(asset) => Some(asset),
        Err(e) => {
            tracing::warn!(market = %market.symbol, error = %e, "Skipping malformed market");
            None
        }
    }
}

fn try_format_market(market: &ApiMarket, token: &constants::Token) -> Result<Asset, CalcError> {
    let collateral_factor = unit_fraction(
        "collateral factor",
        from_mantissa(&parse_decimal(&market.collateral_factor)?),
    )?;
    let reserve_factor = unit_fraction(
        "reserve factor",
        from_mantissa(&parse_decimal(&market.reserve_factor)?),
    )?;

    Ok(Asset {
        id: TokenId::new(token.id),
        name: market.name.clone(),
        symbol: market.symbol.clone(),
        vtoken_address: market.address.to_lowercase(),
        underlying_address: market
            .underlying_address
            .as_ref()
            .filter(|a| !a.is_empty())
            .map(|a| a.to_lowercase()),
        decimals: token.decimals,

        token_price_dollars: parse_decimal(&market.token_price)?,

        supply_apy: parse_rate(&market.supply_apy),
        borrow_apy: -parse_rate(&market.borrow_apy).abs(),
        reward_supply_apr: parse_rate(&market.supply_venus_apr),
        reward_supply_apy: parse_rate(&market.supply_venus_apy),
        reward_borrow_apr: parse_rate(&market.borrow_venus_apr),
        reward_borrow_apy: parse_rate(&market.borrow_venus_apy),

        collateral_factor,
        reserve_factor,
        exchange_rate: parse_decimal(&market.exchange_rate)?,
        supply_rate_per_block: parse_decimal(&market.supply_rate_per_block)?,
        borrow_rate_per_block: parse_decimal(&market.borrow_rate_per_block)?,
        borrow_cap_tokens: parse_decimal(&market.borrow_caps)?,
        liquidity_cents: dollars_to_cents(&parse_decimal(&market.liquidity)?),

        total_supply_wei: parse_wei(&market.total_supply)?,
        total_supply_tokens: parse_decimal(&market.total_supply2)?,
        total_supply_cents: dollars_to_cents(&parse_decimal(&market.total_supply_usd)?),
        total_borrows_wei: parse_wei(&market.total_borrows)?,
        total_borrows_tokens: parse_decimal(&market.total_borrows2)?,
        total_borrows_cents: dollars_to_cents(&parse_decimal(&market.total_borrows_usd)?),
        total_reserves_wei: parse_wei(&market.total_reserves)?,

        supply_daily_reward_wei: parse_wei(&market.supplier_daily_venus)?,
        borrow_daily_reward_wei: parse_wei(&market.borrower_daily_venus)?,
        total_reward_distributed_wei: parse_wei(&market.total_distributed2)?,

        supplier_count: market.supplier_count,
        borrower_count: market.borrower_count,
    })
}

/// Convert one history entry
pub fn format_snapshot(snapshot: &ApiAssetSnapshot) -> lendscope_core::Result<AssetSnapshot> {
    let created_at = DateTime::parse_from_rfc3339(&snapshot.created_at).map_err(|e| {
        MarketError::ParseError(format!("bad snapshot timestamp {:?}: {}", snapshot.created_at, e))
    })?;

    Ok(AssetSnapshot {
        timestamp_ms: created_at.timestamp_millis(),
        supply_apy: parse_rate(&snapshot.supply_apy),
        borrow_apy: parse_rate(&snapshot.borrow_apy),
        price_usd: parse_decimal(&snapshot.price_usd)?,
        total_supply: parse_decimal(&snapshot.total_supply)?,
        total_borrow: parse_decimal(&snapshot.total_borrow)?,
    })
}

// Factors must lie in [0, 1] once unscaled
fn unit_fraction(name: &str, value: BigDecimal) -> Result<BigDecimal, CalcError> {
    if value.is_negative() || value > BigDecimal::one() {
        return Err(CalcError::InvalidAmount {
            message: format!("{} {} outside [0, 1]", name, value),
        });
    }
    Ok(value)
}

// Factors arrive scaled by 1e18
fn from_mantissa(raw: &BigDecimal) -> BigDecimal {
    raw * BigDecimal::new(BigInt::from(1), i64::from(protocol::MANTISSA_DECIMALS))
}
