//! Portfolio aggregation
//!
//! Joins market snapshots with one account's balances and derives the
//! account-level totals shown on the dashboard.

use bigdecimal::BigDecimal;
use lendscope_core::CalcError;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::calculator::{
    balance_cents, calculate_collateral_value, calculate_daily_earnings_cents,
    calculate_daily_reward_interest_cents, calculate_net_apy, calculate_percent_of_limit,
    calculate_percentage, calculate_safe_borrow_limit_cents, calculate_yearly_earnings_for_assets,
};
use crate::constants::{self, REWARD_TOKEN_ID, STABLECOIN_TOKEN_ID};
use crate::state::{AccountSnapshot, MarketsData, PortfolioSummary, UserAsset, UserAssets};
use crate::units::{dollars_to_cents, wei_to_tokens};

/// Decimals of the stablecoin and reward token when absent from the token table
const DEFAULT_DECIMALS: u32 = 18;

/// Build the account's view of every market.
///
/// Markets without a balance entry get an empty position. The borrow limit
/// only counts markets the account entered as collateral.
pub fn build_user_assets(
    markets: &MarketsData,
    account: &AccountSnapshot,
) -> Result<UserAssets, CalcError> {
    let mut assets = Vec::with_capacity(markets.assets.len());
    let mut total_borrow_cents = BigDecimal::zero();
    let mut total_supply_cents = BigDecimal::zero();
    let mut total_limit_cents = BigDecimal::zero();
    let mut total_reward_distributed = BigInt::zero();

    for asset in &markets.assets {
        let collateral = account.is_collateral(&asset.vtoken_address);
        let mut user_asset = UserAsset::empty(asset.clone());
        user_asset.collateral = collateral;

        if let Some(balance) = account.balance_for(&asset.vtoken_address) {
            user_asset.wallet_balance_tokens = wei_to_tokens(&balance.token_balance, asset.decimals);
            user_asset.supply_balance_tokens =
                wei_to_tokens(&balance.balance_of_underlying, asset.decimals);
            user_asset.borrow_balance_tokens =
                wei_to_tokens(&balance.borrow_balance_current, asset.decimals);
        }

        total_borrow_cents += balance_cents(&user_asset.borrow_balance_tokens, user_asset.price());
        total_supply_cents += balance_cents(&user_asset.supply_balance_tokens, user_asset.price());
        total_reward_distributed += &asset.total_reward_distributed_wei;

        if collateral {
            let value = calculate_collateral_value(
                &user_asset.supply_balance_tokens,
                user_asset.price(),
                &asset.collateral_factor,
            )?;
            total_limit_cents += dollars_to_cents(&value);
        }

        assets.push(user_asset);
    }

    if let Some(minted) = &account.minted_stablecoin_wei {
        // One stablecoin is one dollar
        let tokens = wei_to_tokens(minted, token_decimals(STABLECOIN_TOKEN_ID));
        total_borrow_cents += dollars_to_cents(&tokens);
    }

    for user_asset in &mut assets {
        user_asset.percent_of_limit = calculate_percent_of_limit(
            &user_asset.borrow_balance_tokens,
            &user_asset.asset.token_price_dollars,
            &total_limit_cents,
        );
    }

    Ok(UserAssets {
        assets,
        total_borrow_balance_cents: total_borrow_cents,
        total_borrow_limit_cents: total_limit_cents,
        total_supply_balance_cents: total_supply_cents,
        total_reward_distributed_wei: total_reward_distributed,
        daily_reward_distributed_wei: markets.daily_reward_wei.clone(),
        account_daily_reward_wei: account.daily_reward_wei.clone(),
    })
}

/// Account-level figures for the dashboard
pub fn summarize(
    user_assets: &UserAssets,
    include_reward_token: bool,
    safe_borrow_limit_percentage: u32,
) -> PortfolioSummary {
    let yearly = calculate_yearly_earnings_for_assets(&user_assets.assets, include_reward_token);
    let daily = yearly.as_ref().map(calculate_daily_earnings_cents);
    let net_apy = yearly
        .as_ref()
        .map(|y| calculate_net_apy(&user_assets.total_supply_balance_cents, y));

    let limit = &user_assets.total_borrow_limit_cents;
    let safe_limit = calculate_safe_borrow_limit_cents(limit, safe_borrow_limit_percentage);

    PortfolioSummary {
        total_supply_cents: user_assets.total_supply_balance_cents.clone(),
        total_borrow_cents: user_assets.total_borrow_balance_cents.clone(),
        borrow_limit_cents: limit.clone(),
        yearly_earnings_cents: yearly,
        daily_earnings_cents: daily,
        net_apy_percentage: net_apy,
        borrow_limit_used_percentage: calculate_percentage(
            &user_assets.total_borrow_balance_cents,
            limit,
        ),
        safe_borrow_limit_percentage: calculate_percentage(&safe_limit, limit),
        safe_borrow_limit_cents: safe_limit,
        daily_reward_interest_cents: daily_reward_interest_cents(user_assets),
    }
}

/// The account's daily reward emission in cents; 0 when either the emission or
/// the reward token price is unknown
pub fn daily_reward_interest_cents(user_assets: &UserAssets) -> BigDecimal {
    match (
        &user_assets.account_daily_reward_wei,
        user_assets.reward_token_price(),
    ) {
        (Some(wei), Some(price)) => {
            calculate_daily_reward_interest_cents(wei, token_decimals(REWARD_TOKEN_ID), price)
        }
        _ => BigDecimal::zero(),
    }
}

fn token_decimals(id: &str) -> u32 {
    constants::token(id)
        .map(|t| t.decimals)
        .unwrap_or(DEFAULT_DECIMALS)
}
