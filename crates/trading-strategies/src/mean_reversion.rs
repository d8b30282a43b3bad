//! Mean-reversion strategy on RSI with trend-adaptive thresholds.
//!
//! In an uptrend (close above its 50-period SMA) oversold is read earlier and
//! overbought later, so dips are bought sooner and rallies held longer.

use serde::{Deserialize, Serialize};
use trading_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{Candle, Signal},
};
use trading_indicators::{Rsi, Sma};
use tracing::debug;

/// Buy/sell RSI levels for one market regime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiBand {
    /// Buy when RSI is below this
    pub buy_below: f64,
    /// Sell when RSI is above this
    pub sell_above: f64,
}

impl RsiBand {
    fn validate(&self, label: &str) -> Result<(), StrategyError> {
        if !(0.0..=100.0).contains(&self.buy_below) || !(0.0..=100.0).contains(&self.sell_above) {
            return Err(StrategyError::InvalidConfig(format!(
                "{label} RSI thresholds must be between 0 and 100"
            )));
        }
        if self.buy_below >= self.sell_above {
            return Err(StrategyError::InvalidConfig(format!(
                "{label} buy threshold must be below sell threshold"
            )));
        }
        Ok(())
    }
}

/// Configuration for the mean-reversion strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanReversionConfig {
    /// RSI calculation period
    pub rsi_period: usize,
    /// SMA period used as the trend filter
    pub trend_period: usize,
    /// Thresholds when close is above the trend SMA
    pub uptrend: RsiBand,
    /// Thresholds otherwise
    pub default_band: RsiBand,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            trend_period: 50,
            uptrend: RsiBand {
                buy_below: 45.0,
                sell_above: 80.0,
            },
            default_band: RsiBand {
                buy_below: 30.0,
                sell_above: 70.0,
            },
        }
    }
}

impl StrategyConfig for MeanReversionConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.rsi_period < 2 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be at least 2".into(),
            ));
        }
        if self.trend_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Trend period must be greater than 0".into(),
            ));
        }
        self.uptrend.validate("Uptrend")?;
        self.default_band.validate("Default")
    }
}

/// RSI mean-reversion strategy.
pub struct MeanReversionStrategy {
    config: MeanReversionConfig,
    rsi: Rsi,
    trend: Sma,
    name: String,
}

impl MeanReversionStrategy {
    /// Create a new mean-reversion strategy.
    pub fn new(config: MeanReversionConfig) -> Self {
        let rsi = Rsi::new(config.rsi_period);
        let trend = Sma::new(config.trend_period);
        let name = format!("Mean Reversion (RSI {})", config.rsi_period);
        Self {
            config,
            rsi,
            trend,
            name,
        }
    }

    /// Check if the newest close sits above the trend SMA.
    ///
    /// Without enough history for the SMA the market is not an uptrend.
    pub fn is_uptrend(&self, candles: &[Candle]) -> bool {
        if !self.trend.has_history(candles) {
            return false;
        }
        match candles.last() {
            Some(last) => last.close > self.trend.latest(candles),
            None => false,
        }
    }

    /// Thresholds in force for this history.
    pub fn band(&self, candles: &[Candle]) -> RsiBand {
        if self.is_uptrend(candles) {
            self.config.uptrend
        } else {
            self.config.default_band
        }
    }
}

impl Default for MeanReversionStrategy {
    fn default() -> Self {
        Self::new(MeanReversionConfig::default())
    }
}

impl Strategy for MeanReversionStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Fades RSI extremes with looser thresholds while price is above its 50-period SMA"
    }

    fn generate_signal(&self, candles: &[Candle]) -> Signal {
        if !self.is_warmed_up(candles.len()) {
            return Signal::Hold;
        }

        let rsi = self.rsi.latest(candles);
        let band = self.band(candles);
        debug!(rsi, buy_below = band.buy_below, sell_above = band.sell_above, "mean reversion");

        if rsi < band.buy_below {
            Signal::Buy
        } else if rsi > band.sell_above {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn min_history(&self) -> usize {
        self.rsi.min_history()
    }
}
