//! Unit conversion between wei, tokens and display strings
//!
//! Every conversion here is exact. Rounding only happens in the `format_*`
//! helpers, which are meant for the final display step.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use lendscope_core::CalcError;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

/// Convert a token amount to its integer wei representation.
///
/// Fails on negative input, or when the amount carries more fractional digits
/// than the token supports (the wei value would not be an integer).
pub fn tokens_to_wei(amount: &BigDecimal, decimals: u32) -> Result<BigInt, CalcError> {
    if amount.is_negative() {
        return Err(CalcError::InvalidAmount {
            message: format!("negative token amount {}", amount),
        });
    }

    let (digits, scale) = amount.as_bigint_and_exponent();
    let shifted = BigDecimal::new(digits, scale - i64::from(decimals));

    if !shifted.is_integer() {
        return Err(CalcError::PrecisionLoss {
            decimals,
            value: amount.to_string(),
        });
    }

    let (wei, _) = shifted.with_scale(0).into_bigint_and_exponent();
    Ok(wei)
}

/// Convert an integer wei amount to tokens (`wei × 10^-decimals`)
pub fn wei_to_tokens(wei: &BigInt, decimals: u32) -> BigDecimal {
    BigDecimal::new(wei.clone(), i64::from(decimals))
}

/// Parse a decimal string; empty input reads as zero
pub fn parse_decimal(raw: &str) -> Result<BigDecimal, CalcError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(BigDecimal::zero());
    }
    BigDecimal::from_str(trimmed).map_err(|_| CalcError::InvalidAmount {
        message: format!("not a decimal number: {:?}", raw),
    })
}

/// Serde `deserialize_with` for request amounts: a decimal JSON string or
/// number, read from its literal text
pub fn deserialize_decimal<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<BigDecimal, D::Error> {
    let raw = market_client::wire::string_or_number(deserializer)?;
    parse_decimal(&raw).map_err(serde::de::Error::custom)
}

/// Parse a wei string. Fractional wei (seen in some API aggregates) is truncated.
pub fn parse_wei(raw: &str) -> Result<BigInt, CalcError> {
    let value = parse_decimal(raw)?;
    let (wei, _) = value
        .with_scale_round(0, RoundingMode::Down)
        .into_bigint_and_exponent();
    Ok(wei)
}

/// Parse a float that is only used for display (rates, percentages).
/// Unparseable or empty input becomes NaN so callers can detect it with `is_finite`.
pub fn parse_rate(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Bring a display-only float into decimal math through its shortest decimal form.
///
/// Returns `None` for NaN and infinities.
pub fn decimal_from_f64(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    BigDecimal::from_str(&value.to_string()).ok()
}

/// `percent / 100`, exact
pub fn percent_to_fraction(percent: &BigDecimal) -> BigDecimal {
    percent * BigDecimal::new(BigInt::from(1), 2)
}

/// Dollars to cents, exact
pub fn dollars_to_cents(dollars: &BigDecimal) -> BigDecimal {
    dollars * BigDecimal::from(100)
}

/// Round a token amount for display (half-up), trimming trailing zeros
pub fn format_tokens(amount: &BigDecimal, display_decimals: u32) -> String {
    let rounded = amount.with_scale_round(i64::from(display_decimals), RoundingMode::HalfUp);
    trim_trailing_zeros(rounded.to_plain_string())
}

/// Format a cent amount as dollars, e.g. `$1,234.56`
pub fn format_cents(cents: &BigDecimal) -> String {
    let dollars = (cents * BigDecimal::new(BigInt::from(1), 2))
        .with_scale_round(2, RoundingMode::HalfUp);
    let negative = dollars.is_negative();
    let plain = dollars.abs().to_plain_string();

    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let grouped = group_thousands(int_part);

    format!(
        "{}${}.{}",
        if negative { "-" } else { "" },
        grouped,
        frac_part
    )
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn trim_trailing_zeros(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Serde adapter: `BigInt` wei as a decimal string (also accepts JSON numbers)
pub mod serde_wei {
    use num_bigint::BigInt;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let raw = market_client::wire::integer_string(deserializer)?;
        super::parse_wei(&raw).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for optional values
    pub mod option {
        use num_bigint::BigInt;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<BigInt>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.collect_str(v),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<BigInt>, D::Error> {
            let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
            match raw {
                None | Some(serde_json::Value::Null) => Ok(None),
                Some(value) => {
                    let raw = market_client::wire::integer_value(value)
                        .map_err(serde::de::Error::custom)?;
                    super::super::parse_wei(&raw)
                        .map(Some)
                        .map_err(serde::de::Error::custom)
                }
            }
        }
    }
}
