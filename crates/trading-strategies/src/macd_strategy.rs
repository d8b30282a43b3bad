//! Trend-following strategy on MACD crossovers.
//!
//! Buys when the MACD line crosses above its signal line, or early when the
//! histogram is negative but has risen for two consecutive bars. Sells when
//! the MACD line crosses below the signal line.

use serde::{Deserialize, Serialize};
use trading_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{Candle, Signal},
};
use trading_indicators::{Macd, MacdOutput};
use tracing::debug;

/// Extra candles required on top of `slow_period + signal_period`.
const WARMUP_MARGIN: usize = 5;

/// Configuration for the MACD trend-following strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendFollowingConfig {
    /// Fast EMA period
    pub fast_period: usize,
    /// Slow EMA period
    pub slow_period: usize,
    /// Number of MACD points averaged into the signal line
    pub signal_period: usize,
}

impl Default for TrendFollowingConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl StrategyConfig for TrendFollowingConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_period == 0 || self.signal_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "MACD periods must be greater than 0".into(),
            ));
        }
        if self.fast_period >= self.slow_period {
            return Err(StrategyError::InvalidConfig(
                "Fast period must be less than slow period".into(),
            ));
        }
        Ok(())
    }
}

/// MACD crossover strategy with histogram-reversal early entry.
pub struct TrendFollowingStrategy {
    config: TrendFollowingConfig,
    macd: Macd,
    name: String,
}

impl TrendFollowingStrategy {
    /// Create a new trend-following strategy.
    pub fn new(config: TrendFollowingConfig) -> Self {
        let macd = Macd::with_periods(
            config.fast_period,
            config.slow_period,
            config.signal_period,
        );
        let name = format!(
            "Trend Following (MACD {}/{}/{})",
            config.fast_period, config.slow_period, config.signal_period
        );
        Self { config, macd, name }
    }

    pub fn config(&self) -> &TrendFollowingConfig {
        &self.config
    }

    /// Negative histogram that rose on each of the last two bars.
    fn is_histogram_reversal(h0: f64, h1: f64, h2: f64) -> bool {
        h0 < 0.0 && h0 > h1 && h1 > h2
    }
}

impl Default for TrendFollowingStrategy {
    fn default() -> Self {
        Self::new(TrendFollowingConfig::default())
    }
}

impl Strategy for TrendFollowingStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Follows trends on MACD/signal crossovers with early entry on histogram reversal"
    }

    fn generate_signal(&self, candles: &[Candle]) -> Signal {
        if !self.is_warmed_up(candles.len()) {
            return Signal::Hold;
        }

        let last = candles.len() - 1;
        let current: MacdOutput = self.macd.value_at(candles, last);
        let prev = self.macd.value_at(candles, last - 1);
        let prev2 = self.macd.value_at(candles, last - 2);
        debug!(
            macd = current.macd,
            signal = current.signal,
            histogram = current.histogram,
            "trend following"
        );

        if prev.macd <= prev.signal && current.macd > current.signal {
            return Signal::Buy;
        }
        if prev.macd >= prev.signal && current.macd < current.signal {
            return Signal::Sell;
        }
        if Self::is_histogram_reversal(current.histogram, prev.histogram, prev2.histogram) {
            return Signal::Buy;
        }

        Signal::Hold
    }

    fn min_history(&self) -> usize {
        self.config.slow_period + self.config.signal_period + WARMUP_MARGIN
    }
}
