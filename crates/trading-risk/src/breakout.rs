//! Breakout overlays for HOLD signals (HighRisk and LowRisk).
//!
//! When the wrapped strategy has nothing to say, these scan the recent range
//! for a breakout above the high or a breakdown below the low, grade a
//! breakout by volume, MACD and RSI confirmations, and take profit when
//! price runs too far above a short EMA. Any non-HOLD signal passes through.

use serde::{Deserialize, Serialize};
use trading_core::traits::Indicator;
use trading_core::types::{Candle, Signal};
use trading_indicators::{Ema, Macd, Rsi};
use tracing::debug;

/// Thresholds for one risk appetite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Display name
    pub name: String,
    /// Bars scanned for the range high/low (excluding the current bar)
    pub lookback: usize,
    /// Volume must exceed the lookback average by this factor
    pub volume_multiplier: f64,
    /// RSI confirmation band, inclusive
    pub rsi_low: f64,
    pub rsi_high: f64,
    /// EMA period for the pump filter
    pub pump_ema_period: usize,
    /// Fraction above the EMA that counts as a pump
    pub pump_threshold: f64,
    /// Confirmations needed for STRONG_BUY
    pub strong_confirmations: usize,
    /// Confirmations needed for BUY
    pub buy_confirmations: usize,
    /// Bars scanned for bullish RSI divergence; `None` disables it
    pub divergence_window: Option<usize>,
}

impl RiskProfile {
    /// Aggressive: short range, early entries, divergence buys.
    pub fn high_risk() -> Self {
        Self {
            name: "High Risk".into(),
            lookback: 10,
            volume_multiplier: 1.5,
            rsi_low: 50.0,
            rsi_high: 80.0,
            pump_ema_period: 9,
            pump_threshold: 0.03,
            strong_confirmations: 2,
            buy_confirmations: 0,
            divergence_window: Some(20),
        }
    }

    /// Conservative: long range, every confirmation for a strong entry.
    pub fn low_risk() -> Self {
        Self {
            name: "Low Risk".into(),
            lookback: 20,
            volume_multiplier: 2.0,
            rsi_low: 50.0,
            rsi_high: 70.0,
            pump_ema_period: 21,
            pump_threshold: 0.05,
            strong_confirmations: 3,
            buy_confirmations: 2,
            divergence_window: None,
        }
    }
}

/// Breakout overlay parameterized by a [`RiskProfile`].
#[derive(Debug, Clone)]
pub struct BreakoutOverlay {
    profile: RiskProfile,
    ema: Ema,
    macd: Macd,
    rsi: Rsi,
}

impl BreakoutOverlay {
    pub fn new(profile: RiskProfile) -> Self {
        let ema = Ema::new(profile.pump_ema_period);
        Self {
            profile,
            ema,
            macd: Macd::new(),
            rsi: Rsi::new(14),
        }
    }

    pub fn high_risk() -> Self {
        Self::new(RiskProfile::high_risk())
    }

    pub fn low_risk() -> Self {
        Self::new(RiskProfile::low_risk())
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &RiskProfile {
        &self.profile
    }

    /// Candles needed before the overlay acts.
    pub fn min_history(&self) -> usize {
        let window = self.profile.divergence_window.unwrap_or(0);
        (self.profile.lookback + 1)
            .max(window + 1)
            .max(self.macd.min_history())
    }

    /// Transform the wrapped strategy's signal.
    pub fn apply(&self, candles: &[Candle], inner: Signal) -> Signal {
        if !inner.is_hold() || candles.len() < self.min_history() {
            return inner;
        }

        let last = candles.len() - 1;
        let current = &candles[last];
        let range = &candles[last - self.profile.lookback..last];

        let ema = self.ema.latest(candles);
        if current.close > ema * (1.0 + self.profile.pump_threshold) {
            debug!(overlay = self.name(), close = current.close, ema, "pump, taking profit");
            return Signal::Sell;
        }

        let range_high = range.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let range_low = range.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

        if current.close > range_high {
            let confirmations = self.confirmations(candles, range);
            debug!(overlay = self.name(), range_high, confirmations, "breakout");
            return if confirmations >= self.profile.strong_confirmations {
                Signal::StrongBuy
            } else if confirmations >= self.profile.buy_confirmations {
                Signal::Buy
            } else {
                Signal::Hold
            };
        }

        if current.close < range_low {
            debug!(overlay = self.name(), range_low, "breakdown");
            return Signal::Sell;
        }

        if let Some(window) = self.profile.divergence_window {
            if self.has_bullish_divergence(candles, window) {
                debug!(overlay = self.name(), "bullish RSI divergence");
                return Signal::Buy;
            }
        }

        Signal::Hold
    }

    /// Count volume spike, positive MACD line and RSI inside the band.
    fn confirmations(&self, candles: &[Candle], range: &[Candle]) -> usize {
        let current = &candles[candles.len() - 1];

        let avg_volume = range.iter().map(|c| c.volume).sum::<f64>() / range.len() as f64;
        let volume_spike =
            avg_volume > 0.0 && current.volume > avg_volume * self.profile.volume_multiplier;

        let macd_positive = self.macd.latest(candles).macd > 0.0;

        let rsi = self.rsi.latest(candles);
        let rsi_in_band = (self.profile.rsi_low..=self.profile.rsi_high).contains(&rsi);

        [volume_spike, macd_positive, rsi_in_band]
            .iter()
            .filter(|&&ok| ok)
            .count()
    }

    /// Price made a lower low in the second half of the window while RSI
    /// made a higher low, and the newest close has turned up off that low.
    fn has_bullish_divergence(&self, candles: &[Candle], window: usize) -> bool {
        let len = candles.len();
        let half = window / 2;
        if half == 0 {
            return false;
        }

        let lowest = |from: usize, to: usize| {
            (from..to).min_by(|&a, &b| candles[a].close.total_cmp(&candles[b].close))
        };
        let (Some(earlier), Some(recent)) = (lowest(len - window, len - half), lowest(len - half, len))
        else {
            return false;
        };

        let price_lower_low = candles[recent].close < candles[earlier].close;
        let rsi_higher_low = self.rsi.value_at(candles, recent) > self.rsi.value_at(candles, earlier);
        let turned_up = candles[len - 1].close > candles[recent].close;

        price_lower_low && rsi_higher_low && turned_up
    }
}
