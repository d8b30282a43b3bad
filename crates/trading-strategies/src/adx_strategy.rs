//! Directional strategy on ADX.
//!
//! Only acts when the trend is strong: buys when +DI leads, sells when -DI
//! leads.

use serde::{Deserialize, Serialize};
use trading_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{Candle, Signal},
};
use trading_indicators::Adx;

/// Configuration for the ADX strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdxConfig {
    /// ADX period
    pub period: usize,
    /// Minimum ADX for a trend to count as strong
    pub trend_threshold: f64,
}

impl Default for AdxConfig {
    fn default() -> Self {
        Self {
            period: 14,
            trend_threshold: 25.0,
        }
    }
}

impl StrategyConfig for AdxConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period == 0 {
            return Err(StrategyError::InvalidConfig(
                "ADX period must be greater than 0".into(),
            ));
        }
        if !(0.0..100.0).contains(&self.trend_threshold) {
            return Err(StrategyError::InvalidConfig(
                "ADX trend threshold must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// ADX directional strategy.
pub struct AdxStrategy {
    config: AdxConfig,
    adx: Adx,
}

impl AdxStrategy {
    /// Create a new ADX strategy.
    pub fn new(config: AdxConfig) -> Self {
        let adx = Adx::new(config.period);
        Self { config, adx }
    }
}

impl Default for AdxStrategy {
    fn default() -> Self {
        Self::new(AdxConfig::default())
    }
}

impl Strategy for AdxStrategy {
    fn name(&self) -> &str {
        "ADX Directional"
    }

    fn description(&self) -> &str {
        "Trades the dominant directional indicator when ADX shows a strong trend"
    }

    fn generate_signal(&self, candles: &[Candle]) -> Signal {
        if !self.is_warmed_up(candles.len()) {
            return Signal::Hold;
        }

        let out = self.adx.latest(candles);
        if out.adx <= self.config.trend_threshold {
            return Signal::Hold;
        }

        if out.is_bullish() {
            Signal::Buy
        } else if out.is_bearish() {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn min_history(&self) -> usize {
        self.adx.min_history()
    }
}
