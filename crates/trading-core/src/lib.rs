//! Core types and traits for the trading system.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Candle, CandleWindow)
//! - Signals, orders and account snapshots
//! - Core traits for indicators, strategies and the pipeline collaborators

pub mod types;
pub mod traits;
pub mod error;

pub use error::{TradingError, TradingResult};
pub use types::*;
pub use traits::*;
