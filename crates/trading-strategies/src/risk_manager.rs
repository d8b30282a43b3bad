//! Conservative fallback strategy.
//!
//! Stays flat unless the last bar crashed: a close-to-close drop beyond the
//! panic threshold, or optionally beyond a multiple of the prior ATR, sells.

use serde::{Deserialize, Serialize};
use trading_core::{
    error::StrategyError,
    traits::{Indicator, Strategy, StrategyConfig},
    types::{Candle, Signal},
};
use trading_indicators::Atr;

/// Configuration for the risk-manager strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskManagerConfig {
    /// ATR period; also sets the minimum history
    pub atr_period: usize,
    /// Fractional one-bar drop that triggers a sell (0.08 = 8%)
    pub panic_threshold: f64,
    /// Also sell when the drop exceeds this many ATRs
    pub atr_multiple: Option<f64>,
}

impl Default for RiskManagerConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            panic_threshold: 0.08,
            atr_multiple: None,
        }
    }
}

impl StrategyConfig for RiskManagerConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.atr_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "ATR period must be greater than 0".into(),
            ));
        }
        if !(self.panic_threshold > 0.0 && self.panic_threshold < 1.0) {
            return Err(StrategyError::InvalidConfig(
                "Panic threshold must be between 0 and 1".into(),
            ));
        }
        if let Some(multiple) = self.atr_multiple {
            if !(multiple > 0.0 && multiple.is_finite()) {
                return Err(StrategyError::InvalidConfig(
                    "ATR multiple must be positive".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Safe default strategy: HOLD unless the market just crashed.
pub struct RiskManagerStrategy {
    config: RiskManagerConfig,
    atr: Atr,
}

impl RiskManagerStrategy {
    /// Create a new risk-manager strategy.
    pub fn new(config: RiskManagerConfig) -> Self {
        let atr = Atr::new(config.atr_period);
        Self { config, atr }
    }

    pub fn config(&self) -> &RiskManagerConfig {
        &self.config
    }
}

impl Default for RiskManagerStrategy {
    fn default() -> Self {
        Self::new(RiskManagerConfig::default())
    }
}

impl Strategy for RiskManagerStrategy {
    fn name(&self) -> &str {
        "Risk Manager"
    }

    fn description(&self) -> &str {
        "Holds by default and sells on a single-bar crash"
    }

    fn generate_signal(&self, candles: &[Candle]) -> Signal {
        if !self.is_warmed_up(candles.len()) {
            return Signal::Hold;
        }

        let last = candles.len() - 1;
        let prev_close = candles[last - 1].close;
        let drop = prev_close - candles[last].close;

        if prev_close > 0.0 && drop / prev_close > self.config.panic_threshold {
            return Signal::Sell;
        }

        if let Some(multiple) = self.config.atr_multiple {
            let atr = self.atr.value_at(candles, last - 1);
            if atr > 0.0 && drop > multiple * atr {
                return Signal::Sell;
            }
        }

        Signal::Hold
    }

    fn min_history(&self) -> usize {
        self.atr.min_history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_then(last: f64, flat_len: usize) -> Vec<Candle> {
        let mut closes = vec![100.0; flat_len];
        closes.push(last);
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64, c, c + 0.5, c - 0.5, c, 10.0, i as i64))
            .collect()
    }

    #[test]
    fn test_config_validation() {
        assert!(RiskManagerConfig::default().validate().is_ok());

        let config = RiskManagerConfig {
            panic_threshold: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RiskManagerConfig {
            atr_multiple: Some(-1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_config_rejected() {
        let config = RiskManagerConfig {
            panic_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RiskManagerConfig {
            atr_multiple: Some(f64::NAN),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_crash_sells() {
        let strategy = RiskManagerStrategy::default();
        assert_eq!(strategy.generate_signal(&flat_then(90.0, 60)), Signal::Sell);
    }

    #[test]
    fn test_small_drop_holds() {
        let strategy = RiskManagerStrategy::default();
        assert_eq!(strategy.generate_signal(&flat_then(95.0, 60)), Signal::Hold);
        assert_eq!(strategy.generate_signal(&flat_then(100.0, 60)), Signal::Hold);
    }

    #[test]
    fn test_short_history_holds() {
        let strategy = RiskManagerStrategy::default();
        assert_eq!(strategy.min_history(), 15);
        assert_eq!(strategy.generate_signal(&flat_then(50.0, 13)), Signal::Hold);
        assert_eq!(strategy.generate_signal(&flat_then(50.0, 14)), Signal::Sell);
    }

    #[test]
    fn test_atr_multiple_catches_volatility_shock() {
        // Flat candles have ATR 1; a 3-point drop is 3%.
        let data = flat_then(97.0, 30);

        let plain = RiskManagerStrategy::default();
        assert_eq!(plain.generate_signal(&data), Signal::Hold);

        let atr_aware = RiskManagerStrategy::new(RiskManagerConfig {
            atr_multiple: Some(2.0),
            ..Default::default()
        });
        assert_eq!(atr_aware.generate_signal(&data), Signal::Sell);
    }
}
