//! Streak strategy: buys after a run of non-decreasing closes.

use serde::{Deserialize, Serialize};
use trading_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig},
    types::{Candle, Signal},
};

/// Configuration for the streak strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakConfig {
    /// Number of most recent closes that must not decrease
    pub length: usize,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self { length: 5 }
    }
}

impl StrategyConfig for StreakConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.length < 2 {
            return Err(StrategyError::InvalidConfig(
                "Streak length must be at least 2".into(),
            ));
        }
        Ok(())
    }
}

/// Buys when the last N closes never step down.
pub struct StreakStrategy {
    config: StreakConfig,
    name: String,
}

impl StreakStrategy {
    pub fn new(config: StreakConfig) -> Self {
        let name = format!("Streak (last {})", config.length);
        Self { config, name }
    }
}

impl Default for StreakStrategy {
    fn default() -> Self {
        Self::new(StreakConfig::default())
    }
}

impl Strategy for StreakStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Buys after a run of non-decreasing closes"
    }

    fn generate_signal(&self, candles: &[Candle]) -> Signal {
        if !self.is_warmed_up(candles.len()) {
            return Signal::Hold;
        }

        let recent = &candles[candles.len() - self.config.length..];
        if recent.windows(2).all(|w| w[0].close <= w[1].close) {
            Signal::Buy
        } else {
            Signal::Hold
        }
    }

    fn min_history(&self) -> usize {
        self.config.length
    }
}
