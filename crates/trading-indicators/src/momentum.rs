//! Momentum indicators.

use serde::{Deserialize, Serialize};
use trading_core::traits::Indicator;
use trading_core::types::Candle;

use crate::moving_average::Ema;

/// Relative Strength Index (RSI).
///
/// Simple average of gains and losses over the trailing `period` close-to-close
/// changes. No Wilder smoothing: each evaluation only looks at its own window.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Value returned when there is not enough history.
    pub const NEUTRAL: f64 = 50.0;

    /// Create a new RSI indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn value_at(&self, candles: &[Candle], index: usize) -> f64 {
        if index >= candles.len() || index < self.period {
            return Self::NEUTRAL;
        }

        let (gains, losses) = candles[index - self.period..=index]
            .windows(2)
            .map(|w| w[1].close - w[0].close)
            .fold((0.0, 0.0), |(g, l), change| {
                if change > 0.0 {
                    (g + change, l)
                } else {
                    (g, l - change)
                }
            });

        let period_f64 = self.period as f64;
        let avg_gain = gains / period_f64;
        let avg_loss = losses / period_f64;

        if avg_loss == 0.0 {
            return 100.0;
        }
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }

    fn min_history(&self) -> usize {
        self.period + 1 // Need period+1 closes for period changes
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (mean of the recent MACD line values)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// The signal line is the arithmetic mean of the MACD line at the last
/// `signal_period` indices, skipping indices before `slow_period`. It is not
/// an EMA of the MACD series; strategy thresholds are tuned to this form.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            slow_period: slow,
            signal_period: signal,
        }
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }

    pub fn signal_period(&self) -> usize {
        self.signal_period
    }

    /// MACD line alone at `index`.
    pub fn line_at(&self, candles: &[Candle], index: usize) -> f64 {
        self.fast.value_at(candles, index) - self.slow.value_at(candles, index)
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn value_at(&self, candles: &[Candle], index: usize) -> MacdOutput {
        if index >= candles.len() {
            return MacdOutput::default();
        }

        let macd = self.line_at(candles, index);

        let points: Vec<f64> = (0..self.signal_period)
            .take_while(|&i| i <= index && index - i >= self.slow_period)
            .map(|i| self.line_at(candles, index - i))
            .collect();
        let signal = if points.is_empty() {
            0.0
        } else {
            points.iter().sum::<f64>() / points.len() as f64
        };

        MacdOutput {
            macd,
            signal,
            histogram: macd - signal,
        }
    }

    fn min_history(&self) -> usize {
        self.slow_period + self.signal_period
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::from_price(c, i as i64 * 60_000))
            .collect()
    }

    #[test]
    fn test_rsi_basic() {
        let rsi = Rsi::new(14);
        let closes: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();
        let data = candles(&closes);

        for i in 0..data.len() {
            let value = rsi.value_at(&data, i);
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_rsi_all_gains() {
        let rsi = Rsi::new(5);
        let data = candles(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert!((rsi.latest(&data) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_all_losses() {
        let rsi = Rsi::new(5);
        let data = candles(&[7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        assert!(rsi.latest(&data).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_simple_average() {
        // Two gains of 3 and two losses of 1 -> RS = 3, RSI = 75
        let rsi = Rsi::new(4);
        let data = candles(&[10.0, 13.0, 12.0, 15.0, 14.0]);
        assert!((rsi.latest(&data) - 75.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_insufficient_history_is_neutral() {
        let rsi = Rsi::new(14);
        let data = candles(&[1.0, 2.0, 3.0]);
        assert_eq!(rsi.latest(&data), Rsi::NEUTRAL);
        assert_eq!(rsi.latest(&[]), Rsi::NEUTRAL);
    }

    #[test]
    fn test_rsi_flat_series() {
        let rsi = Rsi::new(14);
        let data = candles(&[100.0; 20]);
        // No losses at all
        assert!((rsi.latest(&data) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_macd_uptrend_positive() {
        let macd = Macd::new();
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let data = candles(&closes);

        let out = macd.latest(&data);
        assert!(out.macd > 0.0);
        assert!((out.histogram - (out.macd - out.signal)).abs() < 1e-10);
    }

    #[test]
    fn test_macd_signal_is_mean_of_recent_lines() {
        let macd = Macd::with_periods(3, 6, 3);
        let closes: Vec<f64> = (0..20).map(|i| 50.0 + (i as f64 * 0.7).cos() * 4.0).collect();
        let data = candles(&closes);

        let expected = (macd.line_at(&data, 19) + macd.line_at(&data, 18) + macd.line_at(&data, 17))
            / 3.0;
        assert!((macd.latest(&data).signal - expected).abs() < 1e-10);
    }

    #[test]
    fn test_macd_signal_skips_points_before_slow_period() {
        let macd = Macd::with_periods(3, 6, 3);
        let closes: Vec<f64> = (0..8).map(|i| 10.0 + i as f64).collect();
        let data = candles(&closes);

        // Index 7: points 7 and 6 are >= slow, point 5 is not.
        let expected = (macd.line_at(&data, 7) + macd.line_at(&data, 6)) / 2.0;
        assert!((macd.value_at(&data, 7).signal - expected).abs() < 1e-10);

        // Index 5: nothing qualifies, signal falls back to 0.
        assert_eq!(macd.value_at(&data, 5).signal, 0.0);
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let macd = Macd::new();
        let data = candles(&[100.0; 60]);
        let out = macd.latest(&data);
        assert!(out.macd.abs() < 1e-10);
        assert!(out.signal.abs() < 1e-10);
    }
}
