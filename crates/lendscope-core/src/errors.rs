//! Error types for Lendscope

use thiserror::Error;

/// Core errors that can occur in Lendscope
#[derive(Debug, Error)]
pub enum Error {
    #[error("Market API error: {0}")]
    Market(#[from] MarketError),

    #[error("Calculation error: {0}")]
    Calculation(#[from] CalcError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Market REST API errors
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Market API unreachable at {url}")]
    Unreachable { url: String },

    #[error("Market API returned error: {message}")]
    ApiError { message: String },

    #[error("Market API request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Token not listed: {token}")]
    UnknownToken { token: String },

    #[error("Market not found: {token}")]
    MarketNotFound { token: String },
}

/// Errors raised by the decimal math core
#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Amount {value} has more precision than {decimals} decimals")]
    PrecisionLoss { decimals: u32, value: String },

    #[error("Asset not found: {token}")]
    UnknownAsset { token: String },

    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: String, available: String },
}

/// Result type alias for Lendscope operations
pub type Result<T> = std::result::Result<T, Error>;

impl CalcError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::PrecisionLoss { .. } => "precision_loss",
            Self::UnknownAsset { .. } => "unknown_asset",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::InsufficientBalance { .. } => "insufficient_balance",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } | Self::PrecisionLoss { .. } => 400,
            Self::InvalidAddress { .. } => 400,
            Self::UnknownAsset { .. } => 404,
            Self::InsufficientBalance { .. } => 422,
        }
    }
}

impl MarketError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => "market_api_unavailable",
            Self::ApiError { .. } => "market_api_error",
            Self::ParseError(_) => "parse_error",
            Self::UnknownToken { .. } => "unknown_token",
            Self::MarketNotFound { .. } => "not_found",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnknownToken { .. } | Self::MarketNotFound { .. } => 404,
            Self::Unreachable { .. } | Self::Timeout { .. } => 503,
            Self::ApiError { .. } | Self::ParseError(_) => 502,
        }
    }
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Market(e) => e.error_code(),
            Self::Calculation(e) => e.error_code(),
            Self::Config(_) => "config_error",
            Self::Serialization(_) => "serialization_error",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Market(e) => e.status_code(),
            Self::Calculation(e) => e.status_code(),
            Self::Config(_) | Self::Serialization(_) => 500,
        }
    }
}
