//! Lending Market Constants
//!
//! Static token configuration and protocol parameters. Token tables are
//! configuration data; a market not listed here is ignored when fetched.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

/// Underlying token configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lowercase symbol used as identifier ("xvs", "usdc")
    pub id: &'static str,
    pub symbol: &'static str,
    pub decimals: u32,
    /// Contract address, empty for the native coin
    pub address: &'static str,
}

/// Interest-bearing market token configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VToken {
    /// Id of the underlying token
    pub id: &'static str,
    pub symbol: &'static str,
    pub decimals: u32,
    pub address: &'static str,
}

/// Comptroller / market protocol parameters
pub mod protocol {
    /// Fixed-point scale of on-chain factors and rates (1e18)
    pub const MANTISSA_DECIMALS: u32 = 18;
    pub const VTOKEN_DECIMALS: u32 = 8;
    /// 3 second blocks
    pub const BLOCKS_PER_DAY: u32 = 28_800;
    pub const DAYS_PER_YEAR: u32 = 365;
}

/// Protocol reward token emitted to suppliers and borrowers
pub const REWARD_TOKEN_ID: &str = "xvs";

/// Protocol stablecoin, valued at one dollar when minted against collateral
pub const STABLECOIN_TOKEN_ID: &str = "vai";

/// `10^18` as a decimal
pub fn mantissa() -> BigDecimal {
    BigDecimal::new(BigInt::from(1), -i64::from(protocol::MANTISSA_DECIMALS))
}

/// Mainnet (BNB Chain) token tables
pub mod mainnet {
    use super::{Token, VToken};

    pub const TOKENS: &[Token] = &[
        Token {
            id: "xvs",
            symbol: "XVS",
            decimals: 18,
            address: "0xcf6bb5389c92bdda8a3747ddb454cb7a64626c63",
        },
        Token {
            id: "sxp",
            symbol: "SXP",
            decimals: 18,
            address: "0x47bead2563dcbf3bf2c9407fea4dc236faba485a",
        },
        Token {
            id: "usdc",
            symbol: "USDC",
            decimals: 18,
            address: "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d",
        },
        Token {
            id: "usdt",
            symbol: "USDT",
            decimals: 18,
            address: "0x55d398326f99059ff775485246999027b3197955",
        },
        Token {
            id: "busd",
            symbol: "BUSD",
            decimals: 18,
            address: "0xe9e7cea3dedca5984780bafc599bd69add087d56",
        },
        Token {
            id: "bnb",
            symbol: "BNB",
            decimals: 18,
            address: "",
        },
        Token {
            id: "btcb",
            symbol: "BTCB",
            decimals: 18,
            address: "0x7130d2a12b9bcbfae4f2634d864a1ee1ce3ead9c",
        },
        Token {
            id: "eth",
            symbol: "ETH",
            decimals: 18,
            address: "0x2170ed0880ac9a755fd29b2688956bd959f933f8",
        },
        Token {
            id: "ltc",
            symbol: "LTC",
            decimals: 18,
            address: "0x4338665cbb7b2485a8855a139b75d5e34ab0db94",
        },
        Token {
            id: "xrp",
            symbol: "XRP",
            decimals: 18,
            address: "0x1d2f0da169ceb9fc7b3144628db156f3f6c60dbe",
        },
        Token {
            id: "dai",
            symbol: "DAI",
            decimals: 18,
            address: "0x1af3f329e8be154074d8769d1ffa4ee058b1dbc3",
        },
        Token {
            id: "vai",
            symbol: "VAI",
            decimals: 18,
            address: "0x4bd17003473389a42daf6a0a729f6fdb328bbbd7",
        },
    ];

    pub const VTOKENS: &[VToken] = &[
        VToken {
            id: "xvs",
            symbol: "vXVS",
            decimals: 8,
            address: "0x151b1e2635a717bcdc836ecd6fbb62b674fe3e1d",
        },
        VToken {
            id: "sxp",
            symbol: "vSXP",
            decimals: 8,
            address: "0x2ff3d0f6990a40261c66e1ff2017acbc282eb6d0",
        },
        VToken {
            id: "usdc",
            symbol: "vUSDC",
            decimals: 8,
            address: "0xeca88125a5adbe82614ffc12d0db554e2e2867c8",
        },
        VToken {
            id: "usdt",
            symbol: "vUSDT",
            decimals: 8,
            address: "0xfd5840cd36d94d7229439859c0112a4185bc0255",
        },
        VToken {
            id: "busd",
            symbol: "vBUSD",
            decimals: 8,
            address: "0x95c78222b3d6e262426483d42cfa53685a67ab9d",
        },
        VToken {
            id: "bnb",
            symbol: "vBNB",
            decimals: 8,
            address: "0xa07c5b74c9b40447a954e1466938b865b6bbea36",
        },
        VToken {
            id: "btcb",
            symbol: "vBTC",
            decimals: 8,
            address: "0x882c173bc7ff3b7786ca16dfed3dfffb9ee7847b",
        },
        VToken {
            id: "eth",
            symbol: "vETH",
            decimals: 8,
            address: "0xf508fcd89b8bd15579dc79a6827cb4686a3592c8",
        },
        VToken {
            id: "ltc",
            symbol: "vLTC",
            decimals: 8,
            address: "0x57a5297f2cb2c0aac9d554660acd6d385ab50c6b",
        },
        VToken {
            id: "xrp",
            symbol: "vXRP",
            decimals: 8,
            address: "0xb248a295732e0225acd3337607cc01068e3b9c10",
        },
        VToken {
            id: "dai",
            symbol: "vDAI",
            decimals: 8,
            address: "0x334b3ecb4dca3593bccc3c7ebd1a1c1d1780fbf1",
        },
    ];
}

/// Look up an underlying token by id (case-insensitive)
pub fn token(id: &str) -> Option<&'static Token> {
    mainnet::TOKENS
        .iter()
        .find(|t| t.id.eq_ignore_ascii_case(id))
}

/// Look up the market token of an underlying token id
pub fn vtoken(id: &str) -> Option<&'static VToken> {
    mainnet::VTOKENS
        .iter()
        .find(|t| t.id.eq_ignore_ascii_case(id))
}

/// Find the underlying token of a market by its vToken address
pub fn token_by_vtoken_address(address: &str) -> Option<&'static Token> {
    mainnet::VTOKENS
        .iter()
        .find(|v| v.address.eq_ignore_ascii_case(address))
        .and_then(|v| token(v.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_vtoken_has_underlying() {
        for v in mainnet::VTOKENS {
            assert!(token(v.id).is_some(), "missing token for {}", v.symbol);
            assert_eq!(v.decimals, protocol::VTOKEN_DECIMALS);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(token("USDC").map(|t| t.decimals), Some(18));
        assert_eq!(
            token_by_vtoken_address("0x95C78222B3D6E262426483D42CFA53685A67AB9D").map(|t| t.id),
            Some("busd")
        );
        assert!(vtoken(STABLECOIN_TOKEN_ID).is_none());
        assert!(token("doge").is_none());
    }

    #[test]
    fn test_mantissa() {
        assert_eq!(
            mantissa(),
            "1000000000000000000".parse::<BigDecimal>().unwrap()
        );
    }
}
