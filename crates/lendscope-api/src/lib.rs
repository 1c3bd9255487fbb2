//! lendscope-api: HTTP API layer for Lendscope
//!
//! Serves market data and account aggregates computed by the `lending` crate.

pub mod dto;
pub mod routes;
pub mod server;
pub mod state;

pub use server::*;
pub use state::{AppState, StateError};
