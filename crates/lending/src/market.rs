//! Market page figures: per-market details, protocol totals, treasury totals
//! and APY/balance chart series.

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::Serialize;

use crate::calculator::balance_cents;
use crate::constants::{self, protocol, REWARD_TOKEN_ID};
use crate::state::{Asset, AssetSnapshot, VTokenBalance};
use crate::units::wei_to_tokens;

/// Details shown on a single market page
#[derive(Debug, Clone, Serialize)]
pub struct MarketDetail {
    /// Interest paid to suppliers per day, in cents (approximate)
    pub daily_supplying_interests_cents: f64,
    /// Interest paid by borrowers per day, in cents (approximate)
    pub daily_borrowing_interests_cents: f64,
    pub reserve_factor_percentage: BigDecimal,
    pub collateral_factor_percentage: BigDecimal,
    pub reserve_tokens: BigDecimal,
    /// vTokens received per underlying token, `None` while the rate is zero
    pub exchange_rate_vtokens: Option<BigDecimal>,
    /// Whole percent, only known once the market's cash has been read
    pub current_utilization_rate: Option<u32>,
    /// Reward tokens emitted per day to the market's suppliers and borrowers
    pub daily_distribution_reward_tokens: BigDecimal,
    pub minted_vtokens: BigDecimal,
}

impl MarketDetail {
    pub fn from_asset(asset: &Asset, cash_wei: Option<&BigInt>) -> Self {
        let supply_rate = per_block_rate(&asset.supply_rate_per_block);
        let borrow_rate = per_block_rate(&asset.borrow_rate_per_block);
        let supply_cents = asset.total_supply_cents.to_f64().unwrap_or(0.0);
        let borrow_cents = asset.total_borrows_cents.to_f64().unwrap_or(0.0);

        let reserve_tokens = wei_to_tokens(&asset.total_reserves_wei, asset.decimals);

        let reward_decimals = constants::token(REWARD_TOKEN_ID)
            .map(|t| t.decimals)
            .unwrap_or(protocol::MANTISSA_DECIMALS);
        let daily_reward_wei = &asset.supply_daily_reward_wei + &asset.borrow_daily_reward_wei;

        let current_utilization_rate =
            cash_wei.and_then(|cash| utilization_rate(asset, cash, &reserve_tokens));

        Self {
            daily_supplying_interests_cents: daily_interest(supply_cents, supply_rate),
            daily_borrowing_interests_cents: daily_interest(borrow_cents, borrow_rate),
            reserve_factor_percentage: fraction_to_percent(&asset.reserve_factor),
            collateral_factor_percentage: fraction_to_percent(&asset.collateral_factor),
            reserve_tokens,
            exchange_rate_vtokens: exchange_rate_vtokens(&asset.exchange_rate, asset.decimals),
            current_utilization_rate,
            daily_distribution_reward_tokens: wei_to_tokens(&daily_reward_wei, reward_decimals),
            minted_vtokens: wei_to_tokens(&asset.total_supply_wei, protocol::VTOKEN_DECIMALS),
        }
    }
}

/// Protocol-wide totals over all listed markets
#[derive(Debug, Clone, Serialize)]
pub struct MarketTotals {
    pub total_supply_cents: BigDecimal,
    pub total_borrow_cents: BigDecimal,
    pub available_liquidity_cents: BigDecimal,
    pub asset_count: usize,
}

pub fn market_totals(assets: &[Asset]) -> MarketTotals {
    let total_supply_cents = assets
        .iter()
        .fold(BigDecimal::zero(), |acc, a| acc + &a.total_supply_cents);
    let total_borrow_cents = assets
        .iter()
        .fold(BigDecimal::zero(), |acc, a| acc + &a.total_borrows_cents);

    MarketTotals {
        available_liquidity_cents: &total_supply_cents - &total_borrow_cents,
        total_supply_cents,
        total_borrow_cents,
        asset_count: assets.len(),
    }
}

/// Holdings of the protocol treasury valued in cents
#[derive(Debug, Clone, Default, Serialize)]
pub struct TreasuryTotals {
    pub treasury_total_balance_cents: BigDecimal,
    pub treasury_total_supply_balance_cents: BigDecimal,
    pub treasury_total_borrow_balance_cents: BigDecimal,
}

/// Sum the treasury's wallet, supply and borrow balances over every market
/// it holds. Balances for unlisted vTokens are ignored.
pub fn treasury_totals(assets: &[Asset], balances: &[VTokenBalance]) -> TreasuryTotals {
    let mut totals = TreasuryTotals::default();

    for balance in balances {
        let Some(asset) = assets
            .iter()
            .find(|a| balance.vtoken.matches(&a.vtoken_address))
        else {
            continue;
        };
        let price = &asset.token_price_dollars;
        let value = |wei: &BigInt| balance_cents(&wei_to_tokens(wei, asset.decimals), price);

        totals.treasury_total_balance_cents += value(&balance.token_balance);
        totals.treasury_total_supply_balance_cents += value(&balance.balance_of_underlying);
        totals.treasury_total_borrow_balance_cents += value(&balance.borrow_balance_current);
    }

    totals
}

/// One point of an APY chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp_ms: i64,
    /// Rounded to two decimals
    pub apy_percentage: f64,
    pub balance_cents: BigDecimal,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartData {
    pub supply: Vec<ChartPoint>,
    pub borrow: Vec<ChartPoint>,
}

/// Build chart series from market history. The API returns newest first;
/// series are chronological.
pub fn chart_data(snapshots: &[AssetSnapshot]) -> ChartData {
    let mut data = ChartData::default();

    for snapshot in snapshots.iter().rev() {
        data.supply.push(ChartPoint {
            timestamp_ms: snapshot.timestamp_ms,
            apy_percentage: round_2dp(snapshot.supply_apy),
            balance_cents: balance_cents(&snapshot.total_supply, &snapshot.price_usd),
        });
        data.borrow.push(ChartPoint {
            timestamp_ms: snapshot.timestamp_ms,
            apy_percentage: round_2dp(snapshot.borrow_apy),
            balance_cents: balance_cents(&snapshot.total_borrow, &snapshot.price_usd),
        });
    }

    data
}

fn per_block_rate(mantissa: &BigDecimal) -> f64 {
    (mantissa / constants::mantissa()).to_f64().unwrap_or(0.0)
}

// Compounded over one day of blocks, display only
fn daily_interest(balance_cents: f64, rate_per_block: f64) -> f64 {
    if rate_per_block == 0.0 {
        return 0.0;
    }
    balance_cents * ((1.0 + rate_per_block).powf(f64::from(protocol::BLOCKS_PER_DAY)) - 1.0)
}

fn fraction_to_percent(fraction: &BigDecimal) -> BigDecimal {
    fraction * BigDecimal::from(100)
}

fn exchange_rate_vtokens(exchange_rate: &BigDecimal, decimals: u32) -> Option<BigDecimal> {
    if !exchange_rate.is_positive() {
        return None;
    }
    let exponent =
        i64::from(protocol::MANTISSA_DECIMALS) + i64::from(decimals) - i64::from(protocol::VTOKEN_DECIMALS);
    let scale = BigDecimal::new(BigInt::from(1), -exponent);
    Some(scale / exchange_rate)
}

fn utilization_rate(asset: &Asset, cash_wei: &BigInt, reserve_tokens: &BigDecimal) -> Option<u32> {
    let cash_tokens = wei_to_tokens(cash_wei, asset.decimals);
    let denominator = cash_tokens + &asset.total_borrows_tokens - reserve_tokens;
    if !denominator.is_positive() {
        return None;
    }
    (&asset.total_borrows_tokens / denominator * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_u32()
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use lendscope_core::Address;

    use super::*;
    use crate::state::fixtures::*;

    fn wei(s: &str) -> BigInt {
        BigInt::from_str(s).unwrap()
    }

    #[test]
    fn test_market_detail_factors_and_reserves() {
        let mut usdc = asset("usdc", VUSDC, "1", "0.8");
        usdc.total_reserves_wei = wei("2500000000000000000000");
        usdc.supply_daily_reward_wei = wei("1000000000000000000");
        usdc.borrow_daily_reward_wei = wei("500000000000000000");
        usdc.total_supply_wei = wei("500000000000000");

        let detail = MarketDetail::from_asset(&usdc, None);
        assert_eq!(detail.collateral_factor_percentage, dec("80"));
        assert_eq!(detail.reserve_factor_percentage, dec("20"));
        assert_eq!(detail.reserve_tokens, dec("2500"));
        assert_eq!(detail.daily_distribution_reward_tokens, dec("1.5"));
        assert_eq!(detail.minted_vtokens, dec("5000000"));
        assert!(detail.current_utilization_rate.is_none());
    }

    #[test]
    fn test_market_detail_exchange_rate() {
        // 0.02 underlying per vToken, scaled by 10^(18 + 18 - 8)
        let usdc = asset("usdc", VUSDC, "1", "0.8");
        let detail = MarketDetail::from_asset(&usdc, None);
        assert_eq!(detail.exchange_rate_vtokens, Some(dec("50")));

        let mut zero = usdc;
        zero.exchange_rate = BigDecimal::zero();
        assert!(MarketDetail::from_asset(&zero, None).exchange_rate_vtokens.is_none());
    }

    #[test]
    fn test_market_detail_utilization() {
        let mut usdc = asset("usdc", VUSDC, "1", "0.8");
        usdc.total_borrows_tokens = dec("400000");
        usdc.total_reserves_wei = wei("100000000000000000000000");
        // cash 900000: 400000 / (900000 + 400000 - 100000) = 33.3%
        let cash = wei("900000000000000000000000");
        let detail = MarketDetail::from_asset(&usdc, Some(&cash));
        assert_eq!(detail.current_utilization_rate, Some(33));
    }

    #[test]
    fn test_market_detail_daily_interest() {
        let mut usdc = asset("usdc", VUSDC, "1", "0.8");
        usdc.supply_rate_per_block = BigDecimal::zero();
        let detail = MarketDetail::from_asset(&usdc, None);
        assert_eq!(detail.daily_supplying_interests_cents, 0.0);

        // 3e-9 per block over 28800 blocks is about 0.00864% a day
        let expected = 80_000_000.0 * ((1.0f64 + 3e-9).powf(28_800.0) - 1.0);
        assert!((detail.daily_borrowing_interests_cents - expected).abs() < 1e-6);
        assert!(detail.daily_borrowing_interests_cents > 6900.0);
    }

    #[test]
    fn test_market_totals() {
        let assets = vec![
            asset("usdc", VUSDC, "1", "0.8"),
            asset("busd", VBUSD, "1", "0.8"),
        ];
        let totals = market_totals(&assets);
        assert_eq!(totals.total_supply_cents, dec("400000000"));
        assert_eq!(totals.total_borrow_cents, dec("160000000"));
        assert_eq!(totals.available_liquidity_cents, dec("240000000"));
        assert_eq!(totals.asset_count, 2);
    }

    #[test]
    fn test_treasury_totals() {
        let assets = vec![
            asset("usdc", VUSDC, "1", "0.8"),
            asset("busd", VBUSD, "2", "0.8"),
        ];
        let balances = vec![
            VTokenBalance {
                vtoken: Address::parse(VUSDC).unwrap(),
                token_balance: wei("3000000000000000000"),
                balance_of_underlying: wei("1000000000000000000"),
                borrow_balance_current: BigInt::zero(),
            },
            VTokenBalance {
                vtoken: Address::parse(VBUSD).unwrap(),
                token_balance: wei("1000000000000000000"),
                balance_of_underlying: BigInt::zero(),
                borrow_balance_current: wei("500000000000000000"),
            },
            VTokenBalance {
                vtoken: Address::parse(VXVS).unwrap(),
                token_balance: wei("1000000000000000000"),
                balance_of_underlying: BigInt::zero(),
                borrow_balance_current: BigInt::zero(),
            },
        ];

        let totals = treasury_totals(&assets, &balances);
        assert_eq!(totals.treasury_total_balance_cents, dec("500"));
        assert_eq!(totals.treasury_total_supply_balance_cents, dec("100"));
        assert_eq!(totals.treasury_total_borrow_balance_cents, dec("100"));
    }

    #[test]
    fn test_chart_data_is_chronological() {
        let snapshot = |ts: i64, apy: f64| AssetSnapshot {
            timestamp_ms: ts,
            supply_apy: apy,
            borrow_apy: -apy,
            price_usd: dec("2"),
            total_supply: dec("10"),
            total_borrow: dec("4"),
        };
        let data = chart_data(&[snapshot(3000, 1.239), snapshot(2000, 1.5), snapshot(1000, 2.0)]);

        let ts: Vec<i64> = data.supply.iter().map(|p| p.timestamp_ms).collect();
        assert_eq!(ts, vec![1000, 2000, 3000]);
        assert_eq!(data.supply[2].apy_percentage, 1.24);
        assert_eq!(data.borrow[0].apy_percentage, -2.0);
        assert_eq!(data.supply[0].balance_cents, dec("2000"));
        assert_eq!(data.borrow[0].balance_cents, dec("800"));
    }

    #[test]
    fn test_chart_data_empty() {
        let data = chart_data(&[]);
        assert!(data.supply.is_empty() && data.borrow.is_empty());
    }
}
