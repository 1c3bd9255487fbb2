//! Lending market math
//!
//! Decimal arithmetic for a compound-style lending market: wei/token
//! conversion, collateral value, borrow limit, earnings, and what-if previews.
//!
//! # Conventions
//!
//! - Token amounts and money are `BigDecimal`; wei is `BigInt`.
//! - Balances are in USD cents unless a name says otherwise.
//! - Borrow APY is stored as a non-positive percentage.
//! - Rounding only happens in [`units::format_tokens`] / [`units::format_cents`]
//!   and when a maximum amount is cut to token precision.

pub mod calculator;
pub mod constants;
pub mod fetch;
pub mod market;
pub mod portfolio;
pub mod preview;
pub mod state;
pub mod units;

// Re-exports
pub use calculator::*;
pub use fetch::*;
pub use market::*;
pub use portfolio::*;
pub use preview::*;
pub use state::*;
