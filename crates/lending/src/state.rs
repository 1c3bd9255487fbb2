//! Lending State Types
//!
//! Market snapshots, per-account balances, and the derived records handed to
//! the UI layer. Money fields are `BigDecimal`; rates are `f64` because they
//! are display values that only enter decimal math through
//! [`crate::units::decimal_from_f64`].

use bigdecimal::BigDecimal;
use lendscope_core::{Address, TokenId};
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::units::serde_wei;

/// Market snapshot of one token, refreshed on every fetch
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub id: TokenId,
    /// Market name ("Venus USDC")
    pub name: String,
    /// vToken symbol ("vUSDC")
    pub symbol: String,
    /// vToken address, lowercase
    pub vtoken_address: String,
    pub underlying_address: Option<String>,
    pub decimals: u32,

    pub token_price_dollars: BigDecimal,

    /// Supply APY in percent
    pub supply_apy: f64,
    /// Borrow APY in percent, never positive
    pub borrow_apy: f64,
    /// Reward token APR/APY in percent; NaN when the API has no figure
    pub reward_supply_apr: f64,
    pub reward_supply_apy: f64,
    pub reward_borrow_apr: f64,
    pub reward_borrow_apy: f64,

    /// Fraction in [0, 1]
    pub collateral_factor: BigDecimal,
    /// Fraction in [0, 1]
    pub reserve_factor: BigDecimal,
    /// Raw exchange rate mantissa
    pub exchange_rate: BigDecimal,
    /// Raw per-block rate mantissas
    pub supply_rate_per_block: BigDecimal,
    pub borrow_rate_per_block: BigDecimal,
    pub borrow_cap_tokens: BigDecimal,
    pub liquidity_cents: BigDecimal,

    /// vToken supply in vToken wei
    #[serde(with = "serde_wei")]
    pub total_supply_wei: BigInt,
    pub total_supply_tokens: BigDecimal,
    pub total_supply_cents: BigDecimal,
    #[serde(with = "serde_wei")]
    pub total_borrows_wei: BigInt,
    pub total_borrows_tokens: BigDecimal,
    pub total_borrows_cents: BigDecimal,
    #[serde(with = "serde_wei")]
    pub total_reserves_wei: BigInt,

    #[serde(with = "serde_wei")]
    pub supply_daily_reward_wei: BigInt,
    #[serde(with = "serde_wei")]
    pub borrow_daily_reward_wei: BigInt,
    #[serde(with = "serde_wei")]
    pub total_reward_distributed_wei: BigInt,

    pub supplier_count: u64,
    pub borrower_count: u64,
}

/// All markets from one fetch
#[derive(Debug, Clone, Serialize)]
pub struct MarketsData {
    pub assets: Vec<Asset>,
    /// Reward token emitted per day across all markets
    #[serde(with = "serde_wei")]
    pub daily_reward_wei: BigInt,
}

impl MarketsData {
    pub fn find(&self, token: &TokenId) -> Option<&Asset> {
        self.assets.iter().find(|a| &a.id == token)
    }
}

/// An asset seen from one account
#[derive(Debug, Clone, Serialize)]
pub struct UserAsset {
    #[serde(flatten)]
    pub asset: Asset,
    pub collateral: bool,
    pub wallet_balance_tokens: BigDecimal,
    pub supply_balance_tokens: BigDecimal,
    pub borrow_balance_tokens: BigDecimal,
    /// Share of the account's borrow limit used by this asset, whole percent
    pub percent_of_limit: u32,
}

impl UserAsset {
    /// Asset with an empty position
    pub fn empty(asset: Asset) -> Self {
        Self {
            asset,
            collateral: false,
            wallet_balance_tokens: BigDecimal::zero(),
            supply_balance_tokens: BigDecimal::zero(),
            borrow_balance_tokens: BigDecimal::zero(),
            percent_of_limit: 0,
        }
    }

    pub fn id(&self) -> &TokenId {
        &self.asset.id
    }

    pub fn price(&self) -> &BigDecimal {
        &self.asset.token_price_dollars
    }
}

/// Balances of one account in one market, as read from chain (all wei)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VTokenBalance {
    pub vtoken: Address,
    /// Underlying tokens held in the wallet
    #[serde(with = "serde_wei")]
    pub token_balance: BigInt,
    /// Underlying tokens supplied
    #[serde(with = "serde_wei")]
    pub balance_of_underlying: BigInt,
    /// Underlying tokens owed, interest included
    #[serde(with = "serde_wei")]
    pub borrow_balance_current: BigInt,
}

/// Account state supplied by the wallet layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// vTokens the account entered as collateral
    #[serde(default)]
    pub collateral_vtokens: Vec<Address>,
    #[serde(default)]
    pub balances: Vec<VTokenBalance>,
    /// Stablecoin minted against the account's collateral
    #[serde(default, with = "serde_wei::option")]
    pub minted_stablecoin_wei: Option<BigInt>,
    /// Reward token the account earns per day across its positions
    #[serde(default, with = "serde_wei::option")]
    pub daily_reward_wei: Option<BigInt>,
}

impl AccountSnapshot {
    pub fn balance_for(&self, vtoken_address: &str) -> Option<&VTokenBalance> {
        self.balances.iter().find(|b| b.vtoken.matches(vtoken_address))
    }

    pub fn is_collateral(&self, vtoken_address: &str) -> bool {
        self.collateral_vtokens
            .iter()
            .any(|a| a.matches(vtoken_address))
    }
}

/// User assets plus account-level totals
#[derive(Debug, Clone, Serialize)]
pub struct UserAssets {
    pub assets: Vec<UserAsset>,
    /// Includes minted stablecoin
    pub total_borrow_balance_cents: BigDecimal,
    pub total_borrow_limit_cents: BigDecimal,
    pub total_supply_balance_cents: BigDecimal,
    #[serde(with = "serde_wei")]
    pub total_reward_distributed_wei: BigInt,
    /// Protocol-wide daily emission
    #[serde(with = "serde_wei")]
    pub daily_reward_distributed_wei: BigInt,
    #[serde(with = "serde_wei::option")]
    pub account_daily_reward_wei: Option<BigInt>,
}

impl UserAssets {
    pub fn find(&self, token: &TokenId) -> Option<&UserAsset> {
        self.assets.iter().find(|a| a.id() == token)
    }

    /// Price of the reward token, when its market is listed
    pub fn reward_token_price(&self) -> Option<&BigDecimal> {
        self.assets
            .iter()
            .find(|a| a.id().as_str() == crate::constants::REWARD_TOKEN_ID)
            .map(UserAsset::price)
    }
}

/// Account overview shown on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub total_supply_cents: BigDecimal,
    pub total_borrow_cents: BigDecimal,
    pub borrow_limit_cents: BigDecimal,
    /// `None` when the account has no assets
    pub yearly_earnings_cents: Option<BigDecimal>,
    pub daily_earnings_cents: Option<BigDecimal>,
    pub net_apy_percentage: Option<f64>,
    pub borrow_limit_used_percentage: f64,
    pub safe_borrow_limit_cents: BigDecimal,
    pub safe_borrow_limit_percentage: f64,
    /// Account reward emission valued in cents, 0 when unknown
    pub daily_reward_interest_cents: BigDecimal,
}

/// One market at one point in time
#[derive(Debug, Clone, Serialize)]
pub struct AssetSnapshot {
    pub timestamp_ms: i64,
    pub supply_apy: f64,
    pub borrow_apy: f64,
    pub price_usd: BigDecimal,
    /// Token units
    pub total_supply: BigDecimal,
    pub total_borrow: BigDecimal,
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_account_snapshot_matches_addresses_case_insensitively() {
        let snapshot: AccountSnapshot = serde_json::from_value(serde_json::json!({
            "collateral_vtokens": ["0xECA88125A5ADBE82614FFC12D0DB554E2E2867C8"],
            "balances": [{
                "vtoken": VBUSD,
                "token_balance": "1000000000000000000",
                "balance_of_underlying": "0",
                "borrow_balance_current": 0
            }],
            "minted_stablecoin_wei": "10000000000000000"
        }))
        .unwrap();

        assert!(snapshot.is_collateral(VUSDC));
        assert!(!snapshot.is_collateral(VBUSD));
        assert!(snapshot.balance_for(&VBUSD.to_uppercase().replace("0X", "0x")).is_some());
        assert_eq!(
            snapshot.minted_stablecoin_wei,
            Some(BigInt::from(10_000_000_000_000_000u64))
        );
    }

    #[test]
    fn test_account_snapshot_defaults() {
        let snapshot: AccountSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.balances.is_empty());
        assert!(snapshot.minted_stablecoin_wei.is_none());
    }

    #[test]
    fn test_user_asset_serializes_flat() {
        let ua = user_asset(asset("usdc", VUSDC, "1", "0.8"), true, "0", "100", "0");
        let json = serde_json::to_value(&ua).unwrap();
        assert_eq!(json["id"], "usdc");
        assert_eq!(json["collateral"], true);
        assert_eq!(json["total_supply_wei"], "0");
    }

    #[test]
    fn test_missing_reward_rate_serializes_as_null() {
        let mut base = asset("usdc", VUSDC, "1", "0.8");
        base.reward_supply_apr = f64::NAN;
        let json = serde_json::to_value(&base).unwrap();
        assert!(json["reward_supply_apr"].is_null());
        assert_eq!(json["reward_borrow_apr"], 4.0);
    }

    #[test]
    fn test_user_assets_reward_price() {
        let mut user_assets = UserAssets {
            assets: vec![
                UserAsset::empty(asset("usdc", VUSDC, "1", "0.8")),
                UserAsset::empty(asset("xvs", VXVS, "4.5", "0.6")),
            ],
            total_borrow_balance_cents: BigDecimal::zero(),
            total_borrow_limit_cents: BigDecimal::zero(),
            total_supply_balance_cents: BigDecimal::zero(),
            total_reward_distributed_wei: BigInt::from(0),
            daily_reward_distributed_wei: BigInt::from(0),
            account_daily_reward_wei: None,
        };
        assert_eq!(user_assets.reward_token_price(), Some(&dec("4.5")));
        assert!(user_assets.find(&TokenId::new("busd")).is_none());

        user_assets.assets.pop();
        assert!(user_assets.reward_token_price().is_none());
    }

    #[test]
    fn test_markets_data_find() {
        let data = MarketsData {
            assets: vec![asset("usdc", VUSDC, "1", "0.8")],
            daily_reward_wei: BigInt::from(0),
        };
        assert_eq!(data.find(&TokenId::new("usdc")).unwrap().symbol, "vUSDC");
        assert!(data.find(&TokenId::new("busd")).is_none());
    }
}
