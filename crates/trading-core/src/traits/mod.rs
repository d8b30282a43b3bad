//! Core traits for the trading system.

mod audit;
mod execution;
mod feed;
mod indicator;
mod strategy;

pub use audit::AuditSink;
pub use execution::{BalanceSource, OrderExecutor, OrderSizer};
pub use feed::PriceFeed;
pub use indicator::Indicator;
pub use strategy::{Strategy, StrategyConfig};
