//! Lending Calculator
//!
//! Pure decimal math for collateral value, earnings and borrow limits.
//! No I/O - just calculations. Amounts stay in `BigDecimal` throughout;
//! only final percentages are converted to `f64`.

use bigdecimal::{BigDecimal, RoundingMode};
use lendscope_core::CalcError;
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::constants::protocol;
use crate::state::UserAsset;
use crate::units::{decimal_from_f64, dollars_to_cents, percent_to_fraction, wei_to_tokens};

/// Collateral value in USD: `amount × price × collateral_factor`
pub fn calculate_collateral_value(
    token_amount: &BigDecimal,
    price_dollars: &BigDecimal,
    collateral_factor: &BigDecimal,
) -> Result<BigDecimal, CalcError> {
    if collateral_factor.is_negative() || collateral_factor > &BigDecimal::one() {
        return Err(CalcError::InvalidAmount {
            message: format!("collateral factor {} outside [0, 1]", collateral_factor),
        });
    }
    Ok(token_amount * price_dollars * collateral_factor)
}

/// Collateral value in USD of a wei amount
pub fn collateral_value_from_wei(
    wei: &BigInt,
    decimals: u32,
    price_dollars: &BigDecimal,
    collateral_factor: &BigDecimal,
) -> Result<BigDecimal, CalcError> {
    calculate_collateral_value(&wei_to_tokens(wei, decimals), price_dollars, collateral_factor)
}

/// Value of a token amount in cents
pub fn balance_cents(tokens: &BigDecimal, price_dollars: &BigDecimal) -> BigDecimal {
    dollars_to_cents(&(tokens * price_dollars))
}

/// Yearly earnings of one position in cents.
///
/// Borrow APY is treated as a cost whatever its stored sign. The reward term is
/// only added when both reward APRs are known.
pub fn calculate_yearly_earnings_for_asset(
    asset: &UserAsset,
    include_reward_token: bool,
) -> BigDecimal {
    let supply_cents = balance_cents(&asset.supply_balance_tokens, asset.price());
    let borrow_cents = balance_cents(&asset.borrow_balance_tokens, asset.price());

    let supply_apy = rate_fraction(asset.asset.supply_apy);
    let borrow_apy = -rate_fraction(asset.asset.borrow_apy).abs();

    let supply_yearly = &supply_cents * supply_apy;
    let borrow_yearly = &borrow_cents * borrow_apy;
    let mut total = &supply_yearly + &borrow_yearly;

    if include_reward_token {
        let supply_apr = decimal_from_f64(asset.asset.reward_supply_apr);
        let borrow_apr = decimal_from_f64(asset.asset.reward_borrow_apr);
        if let (Some(supply_apr), Some(borrow_apr)) = (supply_apr, borrow_apr) {
            total += supply_yearly * percent_to_fraction(&supply_apr)
                + borrow_yearly * percent_to_fraction(&borrow_apr);
        }
    }

    total
}

/// Sum of yearly earnings in cents, `None` for an empty portfolio
pub fn calculate_yearly_earnings_for_assets(
    assets: &[UserAsset],
    include_reward_token: bool,
) -> Option<BigDecimal> {
    if assets.is_empty() {
        return None;
    }
    Some(
        assets
            .iter()
            .map(|a| calculate_yearly_earnings_for_asset(a, include_reward_token))
            .fold(BigDecimal::zero(), |acc, v| acc + v),
    )
}

pub fn calculate_daily_earnings_cents(yearly_earnings_cents: &BigDecimal) -> BigDecimal {
    yearly_earnings_cents / BigDecimal::from(protocol::DAYS_PER_YEAR)
}

/// Net APY in percent; 0 without supply
pub fn calculate_net_apy(supply_balance_cents: &BigDecimal, yearly_earnings_cents: &BigDecimal) -> f64 {
    calculate_percentage(yearly_earnings_cents, supply_balance_cents)
}

/// `numerator / denominator × 100`; 0 when the denominator is 0
pub fn calculate_percentage(numerator: &BigDecimal, denominator: &BigDecimal) -> f64 {
    if denominator.is_zero() {
        return 0.0;
    }
    (numerator * BigDecimal::from(100) / denominator)
        .to_f64()
        .unwrap_or(0.0)
}

/// Share of the borrow limit used by one borrow position, in whole percent
/// (rounded down). 0 when there is no limit.
pub fn calculate_percent_of_limit(
    borrow_balance_tokens: &BigDecimal,
    price_dollars: &BigDecimal,
    total_borrow_limit_cents: &BigDecimal,
) -> u32 {
    if !total_borrow_limit_cents.is_positive() {
        return 0;
    }
    let borrow_cents = balance_cents(borrow_balance_tokens, price_dollars);
    let percent = borrow_cents / total_borrow_limit_cents * BigDecimal::from(100);

    percent
        .with_scale_round(0, RoundingMode::Down)
        .to_u64()
        .map(|p| p.min(u64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

/// Part of the borrow limit considered safe to use
pub fn calculate_safe_borrow_limit_cents(
    borrow_limit_cents: &BigDecimal,
    safe_percentage: u32,
) -> BigDecimal {
    borrow_limit_cents * percent_to_fraction(&BigDecimal::from(safe_percentage))
}

/// Daily reward emission valued in cents
pub fn calculate_daily_reward_interest_cents(
    daily_reward_wei: &BigInt,
    reward_decimals: u32,
    reward_price_dollars: &BigDecimal,
) -> BigDecimal {
    balance_cents(&wei_to_tokens(daily_reward_wei, reward_decimals), reward_price_dollars)
}

// Unknown rates count as zero
fn rate_fraction(percent: f64) -> BigDecimal {
    decimal_from_f64(percent)
        .map(|p| percent_to_fraction(&p))
        .unwrap_or_else(BigDecimal::zero)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::state::fixtures::*;

    #[test]
    fn test_collateral_value_example() {
        let wei = BigInt::from_str("100000000000000000").unwrap();
        let value = collateral_value_from_wei(&wei, 18, &dec("0.81"), &dec("1.0")).unwrap();
        assert_eq!(value, dec("0.081"));
    }

    #[test]
    fn test_collateral_factor_bounds() {
        assert!(calculate_collateral_value(&dec("1"), &dec("1"), &dec("1.01")).is_err());
        assert!(calculate_collateral_value(&dec("1"), &dec("1"), &dec("-0.1")).is_err());
        assert_eq!(
            calculate_collateral_value(&dec("5"), &dec("2"), &dec("0")).unwrap(),
            dec("0")
        );
    }

    #[test]
    fn test_collateral_value_is_monotonic() {
        let steps = ["0", "0.5", "1", "2.25", "10"];
        let factors = ["0", "0.25", "0.6", "1"];
        for w in steps.windows(2) {
            let (lo, hi) = (dec(w[0]), dec(w[1]));
            for f in factors {
                let f = dec(f);
                let a = calculate_collateral_value(&lo, &dec("3"), &f).unwrap();
                let b = calculate_collateral_value(&hi, &dec("3"), &f).unwrap();
                assert!(a <= b, "amount");
                let a = calculate_collateral_value(&dec("3"), &lo, &f).unwrap();
                let b = calculate_collateral_value(&dec("3"), &hi, &f).unwrap();
                assert!(a <= b, "price");
            }
        }
        for w in factors.windows(2) {
            let a = calculate_collateral_value(&dec("3"), &dec("3"), &dec(w[0])).unwrap();
            let b = calculate_collateral_value(&dec("3"), &dec("3"), &dec(w[1])).unwrap();
            assert!(a <= b, "factor");
        }
    }

    #[test]
    fn test_yearly_earnings_without_reward() {
        let ua = user_asset(asset("usdc", VUSDC, "2", "0.8"), true, "0", "100", "10");
        assert_eq!(calculate_yearly_earnings_for_asset(&ua, false), dec("800"));
    }

    #[test]
    fn test_yearly_earnings_with_reward() {
        let ua = user_asset(asset("usdc", VUSDC, "2", "0.8"), true, "0", "100", "10");
        // 1000 × 2% + (-200) × 4%
        assert_eq!(calculate_yearly_earnings_for_asset(&ua, true), dec("812"));
    }

    #[test]
    fn test_yearly_earnings_positive_borrow_apy_is_a_cost() {
        let mut base = asset("usdc", VUSDC, "2", "0.8");
        base.borrow_apy = 10.0;
        let ua = user_asset(base, true, "0", "100", "10");
        assert_eq!(calculate_yearly_earnings_for_asset(&ua, false), dec("800"));
    }

    #[test]
    fn test_yearly_earnings_skips_unknown_reward() {
        let mut base = asset("usdc", VUSDC, "2", "0.8");
        base.reward_borrow_apr = f64::NAN;
        let ua = user_asset(base, true, "0", "100", "10");
        assert_eq!(calculate_yearly_earnings_for_asset(&ua, true), dec("800"));
    }

    #[test]
    fn test_yearly_earnings_for_assets() {
        assert!(calculate_yearly_earnings_for_assets(&[], true).is_none());

        let assets = vec![
            user_asset(asset("usdc", VUSDC, "2", "0.8"), true, "0", "100", "10"),
            user_asset(asset("busd", VBUSD, "1", "0.8"), false, "0", "50", "0"),
        ];
        // 800 + 5000 × 5%
        assert_eq!(
            calculate_yearly_earnings_for_assets(&assets, false),
            Some(dec("1050"))
        );
    }

    #[test]
    fn test_daily_earnings() {
        assert_eq!(calculate_daily_earnings_cents(&dec("3650")), dec("10"));
    }

    #[test]
    fn test_net_apy_and_percentage() {
        assert_eq!(calculate_net_apy(&dec("0"), &dec("100")), 0.0);
        assert_eq!(calculate_net_apy(&dec("20000"), &dec("800")), 4.0);
        assert_eq!(calculate_percentage(&dec("1"), &dec("4")), 25.0);
        assert_eq!(calculate_percentage(&dec("1"), &dec("0")), 0.0);
    }

    #[test]
    fn test_percent_of_limit() {
        // 10 × $2 = 2000 cents of a 3000 cent limit
        assert_eq!(calculate_percent_of_limit(&dec("10"), &dec("2"), &dec("3000")), 66);
        assert_eq!(calculate_percent_of_limit(&dec("10"), &dec("2"), &dec("2000")), 100);
    }

    #[test]
    fn test_percent_of_limit_zero_limit() {
        for borrow in ["0", "1", "1000000"] {
            assert_eq!(calculate_percent_of_limit(&dec(borrow), &dec("3"), &dec("0")), 0);
        }
    }

    #[test]
    fn test_safe_limit_and_reward_interest() {
        assert_eq!(calculate_safe_borrow_limit_cents(&dec("10000"), 80), dec("8000"));

        let wei = BigInt::from_str("2000000000000000000").unwrap();
        assert_eq!(
            calculate_daily_reward_interest_cents(&wei, 18, &dec("4.5")),
            dec("900")
        );
    }
}
