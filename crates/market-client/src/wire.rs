//! Wire types returned by the market REST API
//!
//! Numeric fields arrive as JSON strings or numbers depending on the endpoint
//! version, so they are kept as strings here and parsed by the consumer.

use serde::{Deserialize, Deserializer, Serialize};

/// Accept a JSON string, number, or null and keep it as a string ("0" for null)
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok("0".to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Accept a JSON string or an integral JSON number and keep it as a string
/// ("0" for null). Numbers with a fraction or exponent are rejected so that
/// integer amounts never pass through a float.
pub fn integer_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    integer_value(value.unwrap_or(serde_json::Value::Null)).map_err(serde::de::Error::custom)
}

/// Same as [`integer_string`] for an already buffered value
pub fn integer_value(value: serde_json::Value) -> Result<String, String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => {
            let raw = n.to_string();
            if raw.contains(['.', 'e', 'E']) {
                Err(format!("expected an integer, got {}", raw))
            } else {
                Ok(raw)
            }
        }
        serde_json::Value::Null => Ok("0".to_string()),
        other => Err(format!("expected string or integer, got {}", other)),
    }
}

/// One lending market as returned by `/governance/venus`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarket {
    pub address: String,
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "string_or_number")]
    pub borrow_apy: String,
    #[serde(deserialize_with = "string_or_number")]
    pub borrow_caps: String,
    #[serde(deserialize_with = "string_or_number")]
    pub borrow_rate_per_block: String,
    #[serde(deserialize_with = "string_or_number")]
    pub borrow_venus_apr: String,
    #[serde(deserialize_with = "string_or_number")]
    pub borrow_venus_apy: String,
    #[serde(default)]
    pub borrower_count: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub borrower_daily_venus: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub cash: String,
    #[serde(deserialize_with = "string_or_number")]
    pub collateral_factor: String,
    #[serde(deserialize_with = "string_or_number")]
    pub exchange_rate: String,
    #[serde(deserialize_with = "string_or_number")]
    pub liquidity: String,
    #[serde(deserialize_with = "string_or_number")]
    pub reserve_factor: String,
    #[serde(default)]
    pub supplier_count: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub supplier_daily_venus: String,
    #[serde(deserialize_with = "string_or_number")]
    pub supply_apy: String,
    #[serde(deserialize_with = "string_or_number")]
    pub supply_rate_per_block: String,
    #[serde(deserialize_with = "string_or_number")]
    pub supply_venus_apy: String,
    #[serde(deserialize_with = "string_or_number")]
    pub supply_venus_apr: String,
    #[serde(deserialize_with = "string_or_number")]
    pub token_price: String,
    /// Total borrows in wei
    #[serde(deserialize_with = "string_or_number")]
    pub total_borrows: String,
    /// Total borrows in tokens
    #[serde(deserialize_with = "string_or_number")]
    pub total_borrows2: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total_borrows_usd: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_distributed: String,
    /// Total reward token distributed, in wei
    #[serde(default, deserialize_with = "string_or_number")]
    pub total_distributed2: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total_reserves: String,
    /// Total supply in vToken wei
    #[serde(deserialize_with = "string_or_number")]
    pub total_supply: String,
    /// Total supply in underlying tokens
    #[serde(deserialize_with = "string_or_number")]
    pub total_supply2: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total_supply_usd: String,
    #[serde(default)]
    pub underlying_address: Option<String>,
    #[serde(default, alias = "underlyingDecimals")]
    pub underlying_decimal: u32,
    #[serde(default)]
    pub underlying_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub underlying_price: String,
    pub underlying_symbol: String,
}

/// Payload of `/governance/venus`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMarketsResponse {
    /// Daily reward token emission across all markets, in wei
    #[serde(deserialize_with = "string_or_number")]
    pub daily_venus: String,
    pub markets: Vec<ApiMarket>,
}

/// Historical snapshot of one market
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAssetSnapshot {
    pub asset: String,
    #[serde(default)]
    pub block_number: u64,
    #[serde(default)]
    pub block_timestamp: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub borrow_apy: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub borrow_venus_apy: String,
    /// RFC 3339 timestamp
    pub created_at: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub exchange_rate: String,
    #[serde(default)]
    pub id: String,
    #[serde(rename = "priceUSD", deserialize_with = "string_or_number")]
    pub price_usd: String,
    #[serde(deserialize_with = "string_or_number")]
    pub supply_apy: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub supply_venus_apy: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total_borrow: String,
    #[serde(deserialize_with = "string_or_number")]
    pub total_supply: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Payload of `/market_history/graph`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAssetHistoryResponse {
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total: u32,
    pub result: Vec<ApiAssetSnapshot>,
}

/// Envelope wrapping every market API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: Option<bool>,
    pub data: Option<T>,
    pub result: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_or_number_accepts_both() {
        #[derive(Deserialize)]
        struct Rate {
            #[serde(deserialize_with = "string_or_number")]
            value: String,
        }

        let s: Rate = serde_json::from_str(r#"{"value": "1.25"}"#).unwrap();
        assert_eq!(s.value, "1.25");
        let n: Rate = serde_json::from_str(r#"{"value": 1.25}"#).unwrap();
        assert_eq!(n.value, "1.25");
        let null: Rate = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(null.value, "0");
        assert!(serde_json::from_str::<Rate>(r#"{"value": [1]}"#).is_err());
    }

    #[test]
    fn test_integer_string_keeps_every_digit() {
        #[derive(Deserialize)]
        struct Wei {
            #[serde(deserialize_with = "integer_string")]
            value: String,
        }

        let big: Wei = serde_json::from_str(r#"{"value": 123456789012345678901}"#).unwrap();
        assert_eq!(big.value, "123456789012345678901");
        let s: Wei = serde_json::from_str(r#"{"value": "42"}"#).unwrap();
        assert_eq!(s.value, "42");
        assert!(serde_json::from_str::<Wei>(r#"{"value": 1.5}"#).is_err());
        assert!(serde_json::from_str::<Wei>(r#"{"value": 1e21}"#).is_err());
    }

    #[test]
    fn test_envelope_without_optional_fields() {
        let env: ApiEnvelope<GetAssetHistoryResponse> =
            serde_json::from_str(r#"{"data": {"result": []}}"#).unwrap();
        assert!(env.status.is_none());
        assert!(env.data.unwrap().result.is_empty());
    }

    #[test]
    fn test_envelope_error_shape() {
        let env: ApiEnvelope<GetMarketsResponse> =
            serde_json::from_str(r#"{"result": "error", "message": "rate limited"}"#).unwrap();
        assert!(env.data.is_none());
        assert_eq!(env.result.as_deref(), Some("error"));
        assert_eq!(env.message.as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_snapshot_price_field_name() {
        let snap: ApiAssetSnapshot = serde_json::from_str(
            r#"{
                "asset": "0x95c78222b3d6e262426483d42cfa53685a67ab9d",
                "borrowApy": "4.05",
                "createdAt": "2022-05-01T00:00:00.000Z",
                "priceUSD": "1.0001",
                "supplyApy": 2.88,
                "totalBorrow": "142662020.22",
                "totalSupply": "51881081291"
            }"#,
        )
        .unwrap();
        assert_eq!(snap.price_usd, "1.0001");
        assert_eq!(snap.supply_apy, "2.88");
        assert_eq!(snap.supply_venus_apy, "");
    }
}
