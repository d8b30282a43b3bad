//! Breakout strategy on SMA crossovers.
//!
//! Generates buy signals when the short SMA crosses above the long SMA
//! (golden cross), and sell signals on the mirror death cross.

use serde::{Deserialize, Serialize};
use trading_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{Candle, Signal},
};
use trading_indicators::Sma;

/// Configuration for the SMA crossover strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaCrossoverConfig {
    /// Short moving average period
    pub short_period: usize,
    /// Long moving average period
    pub long_period: usize,
}

impl Default for SmaCrossoverConfig {
    fn default() -> Self {
        Self {
            short_period: 5,
            long_period: 10,
        }
    }
}

impl StrategyConfig for SmaCrossoverConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.short_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Short period must be greater than 0".into(),
            ));
        }
        if self.short_period >= self.long_period {
            return Err(StrategyError::InvalidConfig(
                "Short period must be less than long period".into(),
            ));
        }
        Ok(())
    }
}

/// SMA crossover strategy.
pub struct SmaCrossoverStrategy {
    config: SmaCrossoverConfig,
    short: Sma,
    long: Sma,
    name: String,
}

impl SmaCrossoverStrategy {
    /// Create a new SMA crossover strategy.
    pub fn new(config: SmaCrossoverConfig) -> Self {
        let short = Sma::new(config.short_period);
        let long = Sma::new(config.long_period);
        let name = format!(
            "SMA Crossover ({}/{})",
            config.short_period, config.long_period
        );
        Self {
            config,
            short,
            long,
            name,
        }
    }

    pub fn config(&self) -> &SmaCrossoverConfig {
        &self.config
    }
}

impl Default for SmaCrossoverStrategy {
    fn default() -> Self {
        Self::new(SmaCrossoverConfig::default())
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Trades short/long SMA golden and death crosses"
    }

    fn generate_signal(&self, candles: &[Candle]) -> Signal {
        // The previous bar needs a full long SMA too.
        if !self.is_warmed_up(candles.len()) {
            return Signal::Hold;
        }

        let last = candles.len() - 1;
        let short = self.short.value_at(candles, last);
        let long = self.long.value_at(candles, last);
        let prev_short = self.short.value_at(candles, last - 1);
        let prev_long = self.long.value_at(candles, last - 1);

        if prev_short <= prev_long && short > long {
            Signal::Buy
        } else if prev_short >= prev_long && short < long {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn min_history(&self) -> usize {
        self.config.long_period + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * 60_000, c, c + 1.0, c - 1.0, c, 1000.0, i as i64 * 60_000))
            .collect()
    }

    fn all_signals(strategy: &SmaCrossoverStrategy, data: &[Candle]) -> Vec<Signal> {
        (1..=data.len())
            .map(|len| strategy.generate_signal(&data[..len]))
            .collect()
    }

    #[test]
    fn test_config_validation() {
        let mut config = SmaCrossoverConfig::default();
        assert!(config.validate().is_ok());

        config.short_period = 20;
        config.long_period = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_golden_cross_fires_once() {
        let strategy = SmaCrossoverStrategy::default();

        // Falls from 20 to 11, then climbs. 5-SMA first exceeds the
        // 10-SMA at index 14 (14.0 vs 13.5), having been 13.0 vs 13.5.
        let closes: Vec<f64> = (0..10)
            .map(|i| 20.0 - i as f64)
            .chain((0..10).map(|i| 12.0 + i as f64))
            .collect();
        let signals = all_signals(&strategy, &candles(&closes));

        for (index, signal) in signals.iter().enumerate() {
            let expected = if index == 14 { Signal::Buy } else { Signal::Hold };
            assert_eq!(*signal, expected, "index {index}");
        }
    }

    #[test]
    fn test_monotonic_rise_has_no_cross() {
        let strategy = SmaCrossoverStrategy::default();
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();

        // The short SMA leads from the first comparable bar, so it never crosses.
        let signals = all_signals(&strategy, &candles(&closes));
        assert!(signals.iter().all(|s| s.is_hold()));
    }

    #[test]
    fn test_death_cross_sells() {
        let strategy = SmaCrossoverStrategy::default();
        let closes: Vec<f64> = (0..10)
            .map(|i| 11.0 + i as f64)
            .chain((0..10).map(|i| 19.0 - i as f64))
            .collect();
        let signals = all_signals(&strategy, &candles(&closes));

        assert_eq!(signals.iter().filter(|s| **s == Signal::Sell).count(), 1);
        assert!(!signals.contains(&Signal::Buy));
    }

    #[test]
    fn test_cross_needs_a_full_previous_bar() {
        let strategy = SmaCrossoverStrategy::default();
        assert_eq!(strategy.min_history(), 11);

        // Same series as the golden cross test, shifted so the cross lands
        // on index 10.
        let closes: Vec<f64> = (0..10)
            .map(|i| 20.0 - i as f64)
            .chain((0..10).map(|i| 12.0 + i as f64))
            .skip(4)
            .collect();
        let data = candles(&closes);

        // Exactly `long_period` candles: no previous long SMA, so no cross.
        assert_eq!(strategy.generate_signal(&data[..10]), Signal::Hold);
        assert_eq!(strategy.generate_signal(&data[..11]), Signal::Buy);
    }

    #[test]
    fn test_short_history_holds() {
        let strategy = SmaCrossoverStrategy::default();
        let data = candles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(strategy.generate_signal(&data), Signal::Hold);
    }
}
