//! What-if previews for pending supply, withdraw, borrow and repay input
//!
//! Every figure is computed on a copy of the account's assets; nothing here
//! mutates account state.

use bigdecimal::{BigDecimal, RoundingMode};
use lendscope_core::{CalcError, TokenId};
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::calculator::{
    balance_cents, calculate_collateral_value, calculate_daily_earnings_cents,
    calculate_percentage, calculate_safe_borrow_limit_cents, calculate_yearly_earnings_for_assets,
};
use crate::state::{UserAsset, UserAssets};
use crate::units::{dollars_to_cents, percent_to_fraction};

/// Operation entered in a form but not yet submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingAction {
    Supply,
    Withdraw,
    Borrow,
    Repay,
}

impl PendingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingAction::Supply => "supply",
            PendingAction::Withdraw => "withdraw",
            PendingAction::Borrow => "borrow",
            PendingAction::Repay => "repay",
        }
    }
}

/// Current and hypothetical account figures. Hypothetical values are `None`
/// while the entered amount is zero.
#[derive(Debug, Clone, Serialize)]
pub struct PositionPreview {
    pub token: TokenId,
    pub action: PendingAction,
    pub amount_tokens: BigDecimal,

    pub supply_balance_tokens: BigDecimal,
    pub hypothetical_supply_balance_tokens: Option<BigDecimal>,
    pub borrow_balance_tokens: BigDecimal,
    pub hypothetical_borrow_balance_tokens: Option<BigDecimal>,

    pub borrow_balance_cents: BigDecimal,
    pub hypothetical_borrow_balance_cents: Option<BigDecimal>,
    pub borrow_limit_cents: BigDecimal,
    pub hypothetical_borrow_limit_cents: Option<BigDecimal>,
    pub borrow_limit_used_percentage: f64,
    pub hypothetical_borrow_limit_used_percentage: Option<f64>,

    pub daily_earnings_cents: Option<BigDecimal>,
    pub hypothetical_daily_earnings_cents: Option<BigDecimal>,
}

/// Preview the effect of `action` with `amount_tokens` on the given market
pub fn preview(
    user_assets: &UserAssets,
    token: &TokenId,
    action: PendingAction,
    amount_tokens: &BigDecimal,
    include_reward_token: bool,
) -> Result<PositionPreview, CalcError> {
    let asset = find_asset(user_assets, token)?;

    if amount_tokens.is_negative() {
        return Err(CalcError::InvalidAmount {
            message: format!("negative {} amount {}", action.as_str(), amount_tokens),
        });
    }

    let available = match action {
        PendingAction::Supply => Some(asset.wallet_balance_tokens.clone()),
        PendingAction::Withdraw => Some(asset.supply_balance_tokens.clone()),
        PendingAction::Repay => Some(max_repay_tokens(asset)),
        PendingAction::Borrow => None,
    };
    if let Some(available) = available {
        if amount_tokens > &available {
            return Err(CalcError::InsufficientBalance {
                required: amount_tokens.to_string(),
                available: available.to_string(),
            });
        }
    }

    let borrow_cents = &user_assets.total_borrow_balance_cents;
    let limit_cents = &user_assets.total_borrow_limit_cents;
    let daily = daily_earnings(&user_assets.assets, include_reward_token);

    let mut result = PositionPreview {
        token: token.clone(),
        action,
        amount_tokens: amount_tokens.clone(),
        supply_balance_tokens: asset.supply_balance_tokens.clone(),
        hypothetical_supply_balance_tokens: None,
        borrow_balance_tokens: asset.borrow_balance_tokens.clone(),
        hypothetical_borrow_balance_tokens: None,
        borrow_balance_cents: borrow_cents.clone(),
        hypothetical_borrow_balance_cents: None,
        borrow_limit_cents: limit_cents.clone(),
        hypothetical_borrow_limit_cents: None,
        borrow_limit_used_percentage: calculate_percentage(borrow_cents, limit_cents),
        hypothetical_borrow_limit_used_percentage: None,
        daily_earnings_cents: daily,
        hypothetical_daily_earnings_cents: None,
    };

    if amount_tokens.is_zero() {
        return Ok(result);
    }

    let amount_cents = balance_cents(amount_tokens, asset.price());
    let collateral_cents = if asset.collateral {
        dollars_to_cents(&calculate_collateral_value(
            amount_tokens,
            asset.price(),
            &asset.asset.collateral_factor,
        )?)
    } else {
        BigDecimal::zero()
    };

    let mut changed = asset.clone();
    let (new_borrow_cents, new_limit_cents) = match action {
        PendingAction::Supply => {
            changed.supply_balance_tokens += amount_tokens;
            (borrow_cents.clone(), limit_cents + &collateral_cents)
        }
        PendingAction::Withdraw => {
            changed.supply_balance_tokens -= amount_tokens;
            let limit = limit_cents - &collateral_cents;
            (borrow_cents.clone(), max_zero(limit))
        }
        PendingAction::Borrow => {
            changed.borrow_balance_tokens += amount_tokens;
            (borrow_cents + &amount_cents, limit_cents.clone())
        }
        PendingAction::Repay => {
            changed.borrow_balance_tokens -= amount_tokens;
            (max_zero(borrow_cents - &amount_cents), limit_cents.clone())
        }
    };

    let hypothetical_assets: Vec<UserAsset> = user_assets
        .assets
        .iter()
        .map(|a| if a.id() == token { changed.clone() } else { a.clone() })
        .collect();

    result.hypothetical_borrow_limit_used_percentage =
        Some(calculate_percentage(&new_borrow_cents, &new_limit_cents));
    result.hypothetical_supply_balance_tokens = Some(changed.supply_balance_tokens);
    result.hypothetical_borrow_balance_tokens = Some(changed.borrow_balance_tokens);
    result.hypothetical_borrow_balance_cents = Some(new_borrow_cents);
    result.hypothetical_borrow_limit_cents = Some(new_limit_cents);
    result.hypothetical_daily_earnings_cents =
        daily_earnings(&hypothetical_assets, include_reward_token);

    Ok(result)
}

/// Largest repayment: the debt, limited by what the wallet holds
pub fn max_repay_tokens(asset: &UserAsset) -> BigDecimal {
    if asset.borrow_balance_tokens < asset.wallet_balance_tokens {
        asset.borrow_balance_tokens.clone()
    } else {
        asset.wallet_balance_tokens.clone()
    }
}

/// Largest withdrawal that keeps the account within its safe borrow limit
pub fn max_withdraw_tokens(
    user_assets: &UserAssets,
    token: &TokenId,
    safe_borrow_limit_percentage: u32,
) -> Result<BigDecimal, CalcError> {
    let asset = find_asset(user_assets, token)?;
    let supply = asset.supply_balance_tokens.clone();
    let borrow_cents = &user_assets.total_borrow_balance_cents;

    if !asset.collateral || borrow_cents.is_zero() {
        return Ok(supply);
    }
    if safe_borrow_limit_percentage == 0 {
        return Ok(BigDecimal::zero());
    }

    // Collateral value one token of this asset adds to the limit, in cents
    let cents_per_token = dollars_to_cents(&calculate_collateral_value(
        &BigDecimal::one(),
        asset.price(),
        &asset.asset.collateral_factor,
    )?);
    if cents_per_token.is_zero() {
        return Ok(supply);
    }

    // Limit needed so that the current debt sits exactly at the safe share
    let required_limit = borrow_cents / percent_to_fraction(&BigDecimal::from(safe_borrow_limit_percentage));
    let spare_limit = max_zero(&user_assets.total_borrow_limit_cents - required_limit);
    let withdrawable = spare_limit / cents_per_token;

    Ok(round_down(min(withdrawable, supply), asset.asset.decimals))
}

/// Largest borrow that keeps the account within its safe borrow limit,
/// capped by the market's available liquidity
pub fn max_borrow_tokens(
    user_assets: &UserAssets,
    token: &TokenId,
    safe_borrow_limit_percentage: u32,
) -> Result<BigDecimal, CalcError> {
    let asset = find_asset(user_assets, token)?;
    if !asset.price().is_positive() {
        return Ok(BigDecimal::zero());
    }

    let safe_limit = calculate_safe_borrow_limit_cents(
        &user_assets.total_borrow_limit_cents,
        safe_borrow_limit_percentage,
    );
    let headroom_cents = max_zero(safe_limit - &user_assets.total_borrow_balance_cents);
    let cents_per_token = dollars_to_cents(asset.price());

    let by_limit = &headroom_cents / &cents_per_token;
    let by_liquidity = max_zero(&asset.asset.liquidity_cents / &cents_per_token);

    Ok(round_down(min(by_limit, by_liquidity), asset.asset.decimals))
}

fn find_asset<'a>(user_assets: &'a UserAssets, token: &TokenId) -> Result<&'a UserAsset, CalcError> {
    user_assets
        .find(token)
        .ok_or_else(|| CalcError::UnknownAsset {
            token: token.to_string(),
        })
}

fn daily_earnings(assets: &[UserAsset], include_reward_token: bool) -> Option<BigDecimal> {
    calculate_yearly_earnings_for_assets(assets, include_reward_token)
        .map(|yearly| calculate_daily_earnings_cents(&yearly))
}

fn max_zero(value: BigDecimal) -> BigDecimal {
    if value.is_negative() {
        BigDecimal::zero()
    } else {
        value
    }
}

fn min(a: BigDecimal, b: BigDecimal) -> BigDecimal {
    if a < b {
        a
    } else {
        b
    }
}

fn round_down(value: BigDecimal, decimals: u32) -> BigDecimal {
    value.with_scale_round(i64::from(decimals), RoundingMode::Down)
}
