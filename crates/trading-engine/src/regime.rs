//! ADX regime classification with cooldown hysteresis.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trading_core::error::StrategyError;
use trading_core::traits::{Indicator, Strategy};
use trading_core::types::Candle;
use trading_indicators::Adx;
use trading_strategies::{StrategyKind, StrategyRegistry};
use tracing::info;

/// Regime classification parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// ADX above this selects trend following
    pub trend_threshold: f64,
    /// ADX below this selects mean reversion
    pub range_threshold: f64,
    /// Ticks to hold a strategy after switching
    pub cooldown: usize,
    /// Candles required before classifying at all
    pub min_history: usize,
    /// ADX period
    pub adx_period: usize,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            trend_threshold: 25.0,
            range_threshold: 20.0,
            cooldown: 5,
            min_history: 30,
            adx_period: 14,
        }
    }
}

impl RegimeConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.adx_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "ADX period must be greater than 0".into(),
            ));
        }
        if !(self.range_threshold.is_finite() && self.trend_threshold.is_finite()) {
            return Err(StrategyError::InvalidConfig(
                "regime thresholds must be finite".into(),
            ));
        }
        if self.range_threshold > self.trend_threshold {
            return Err(StrategyError::InvalidConfig(format!(
                "range threshold {} exceeds trend threshold {}",
                self.range_threshold, self.trend_threshold
            )));
        }
        Ok(())
    }
}

/// A strategy switch, emitted once per change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeTransition {
    pub from: StrategyKind,
    pub to: StrategyKind,
    /// ADX reading that caused the switch
    pub adx: f64,
}

/// Picks trend following, mean reversion or the risk-manager default.
///
/// State is the active kind plus a cooldown counter. Each call with enough
/// history either spends one cooldown tick or re-classifies; a switch resets
/// the cooldown so the choice cannot flip again for `cooldown` calls.
pub struct RegimeSelector {
    config: RegimeConfig,
    adx: Adx,
    trend: Arc<dyn Strategy>,
    range: Arc<dyn Strategy>,
    fallback: Arc<dyn Strategy>,
    active: StrategyKind,
    cooldown: usize,
}

impl RegimeSelector {
    /// Create a selector using the registry's default strategy configs.
    pub fn new(config: RegimeConfig, registry: &StrategyRegistry) -> Result<Self, StrategyError> {
        let fallback = registry.create_default(StrategyKind::RiskManager)?;
        Self::with_fallback(config, registry, fallback)
    }

    /// Create a selector with a custom risk-manager default.
    pub fn with_fallback(
        config: RegimeConfig,
        registry: &StrategyRegistry,
        fallback: Arc<dyn Strategy>,
    ) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self {
            adx: Adx::new(config.adx_period),
            trend: registry.create_default(StrategyKind::TrendFollowing)?,
            range: registry.create_default(StrategyKind::MeanReversion)?,
            fallback,
            active: StrategyKind::RiskManager,
            cooldown: 0,
            config,
        })
    }

    pub fn active(&self) -> StrategyKind {
        self.active
    }

    /// Remaining cooldown ticks.
    pub fn cooldown(&self) -> usize {
        self.cooldown
    }

    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }

    /// Choose the base strategy for this tick.
    ///
    /// Call exactly once per tick. Below the minimum history the default is
    /// returned and the state is left alone.
    pub fn select(&mut self, candles: &[Candle]) -> (Arc<dyn Strategy>, Option<RegimeTransition>) {
        if candles.len() < self.config.min_history {
            return (self.fallback.clone(), None);
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
            return (self.strategy(self.active), None);
        }

        let adx = self.adx.latest(candles).adx;
        let target = self.classify(adx);
        if target == self.active {
            return (self.strategy(self.active), None);
        }

        let transition = RegimeTransition {
            from: self.active,
            to: target,
            adx,
        };
        info!(
            from = %transition.from,
            to = %transition.to,
            adx = format!("{:.2}", adx),
            cooldown = self.config.cooldown,
            "regime switch"
        );
        self.active = target;
        self.cooldown = self.config.cooldown;

        (self.strategy(target), Some(transition))
    }

    fn classify(&self, adx: f64) -> StrategyKind {
        if adx > self.config.trend_threshold {
            StrategyKind::TrendFollowing
        } else if adx < self.config.range_threshold {
            StrategyKind::MeanReversion
        } else {
            StrategyKind::RiskManager
        }
    }

    fn strategy(&self, kind: StrategyKind) -> Arc<dyn Strategy> {
        match kind {
            StrategyKind::TrendFollowing => self.trend.clone(),
            StrategyKind::MeanReversion => self.range.clone(),
            _ => self.fallback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                Candle::new(i as i64, close, close + 1.0, close - 1.0, close, 10.0, i as i64)
            })
            .collect()
    }

    fn flat(n: usize) -> Vec<Candle> {
        (0..n).map(|i| Candle::from_price(100.0, i as i64)).collect()
    }

    fn selector() -> RegimeSelector {
        RegimeSelector::new(RegimeConfig::default(), &StrategyRegistry::new()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let selector = selector();
        assert_eq!(selector.active(), StrategyKind::RiskManager);
        assert_eq!(selector.cooldown(), 0);
    }

    #[test]
    fn test_short_history_keeps_default_without_state_change() {
        let mut selector = selector();
        let (strategy, transition) = selector.select(&trending(29));
        assert_eq!(strategy.name(), "Risk Manager");
        assert!(transition.is_none());
        assert_eq!(selector.cooldown(), 0);
        assert_eq!(selector.active(), StrategyKind::RiskManager);
    }

    #[test]
    fn test_trend_selects_trend_following() {
        let mut selector = selector();
        let (strategy, transition) = selector.select(&trending(40));
        let transition = transition.unwrap();
        assert_eq!(transition.from, StrategyKind::RiskManager);
        assert_eq!(transition.to, StrategyKind::TrendFollowing);
        assert!(transition.adx > 25.0);
        assert_eq!(strategy.name(), "Trend Following (MACD 12/26/9)");
        assert_eq!(selector.cooldown(), 5);
    }

    #[test]
    fn test_hysteresis_holds_for_cooldown() {
        let mut selector = selector();
        selector.select(&trending(40));
        assert_eq!(selector.active(), StrategyKind::TrendFollowing);

        // Flat prices give ADX 0, but the cooldown pins the choice.
        let ranging = flat(40);
        for remaining in (0..5).rev() {
            let (strategy, transition) = selector.select(&ranging);
            assert!(transition.is_none());
            assert_eq!(strategy.name(), "Trend Following (MACD 12/26/9)");
            assert_eq!(selector.cooldown(), remaining);
        }

        let (strategy, transition) = selector.select(&ranging);
        assert_eq!(transition.unwrap().to, StrategyKind::MeanReversion);
        assert_eq!(strategy.name(), "Mean Reversion (RSI 14)");
        assert_eq!(selector.cooldown(), 5);
    }

    #[test]
    fn test_no_switch_keeps_zero_cooldown() {
        let mut selector = selector();
        selector.select(&flat(40));
        for _ in 0..5 {
            selector.select(&flat(40));
        }
        let (_, transition) = selector.select(&flat(40));
        assert!(transition.is_none());
        assert_eq!(selector.active(), StrategyKind::MeanReversion);
        assert_eq!(selector.cooldown(), 0);
    }

    #[test]
    fn test_config_validation() {
        assert!(RegimeConfig::default().validate().is_ok());
        let inverted = RegimeConfig {
            trend_threshold: 15.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let nan = RegimeConfig {
            range_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
        let nan = RegimeConfig {
            trend_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }
}
