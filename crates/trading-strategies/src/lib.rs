//! Trading strategy implementations.
//!
//! This crate provides the strategy catalog:
//! - Trend Following (MACD crossover with histogram-reversal entry)
//! - Mean Reversion (RSI with trend-adaptive thresholds)
//! - Breakout (SMA crossover)
//! - Risk Manager (crash-only fallback)
//! - ADX directional and Streak
//!
//! Strategies are pure: a signal is a function of the candle history alone.

mod adx_strategy;
mod ma_crossover;
mod macd_strategy;
mod mean_reversion;
mod momentum;
mod registry;
mod risk_manager;

pub use adx_strategy::{AdxConfig, AdxStrategy};
pub use ma_crossover::{SmaCrossoverConfig, SmaCrossoverStrategy};
pub use macd_strategy::{TrendFollowingConfig, TrendFollowingStrategy};
pub use mean_reversion::{MeanReversionConfig, MeanReversionStrategy, RsiBand};
pub use momentum::{StreakConfig, StreakStrategy};
pub use registry::{StrategyInfo, StrategyKind, StrategyRegistry};
pub use risk_manager::{RiskManagerConfig, RiskManagerStrategy};
