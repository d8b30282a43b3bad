//! Trend-strength indicators.

use serde::{Deserialize, Serialize};
use trading_core::traits::Indicator;
use trading_core::types::Candle;

/// ADX output: trend strength plus the two directional indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdxOutput {
    /// Trend strength (instantaneous DX)
    pub adx: f64,
    /// Positive directional indicator
    pub plus_di: f64,
    /// Negative directional indicator
    pub minus_di: f64,
}

impl AdxOutput {
    /// Check if upward movement dominates.
    pub fn is_bullish(&self) -> bool {
        self.plus_di > self.minus_di
    }

    /// Check if downward movement dominates.
    pub fn is_bearish(&self) -> bool {
        self.minus_di > self.plus_di
    }
}

/// Average Directional Index, simplified.
///
/// True range and directional movement are summed over the trailing `period`
/// bars without Wilder smoothing, and the reported ADX is that window's DX.
/// Output is neutral (all zero) until `2 * period` candles are available.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
}

impl Adx {
    /// Keeps DX finite when both DIs are zero.
    pub const EPSILON: f64 = 1e-4;

    /// Create a new ADX indicator.
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

impl Default for Adx {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Adx {
    type Output = AdxOutput;

    fn value_at(&self, candles: &[Candle], index: usize) -> AdxOutput {
        if index >= candles.len() || index + 1 < self.min_history() {
            return AdxOutput::default();
        }

        let mut sum_tr = 0.0;
        let mut sum_plus_dm = 0.0;
        let mut sum_minus_dm = 0.0;

        for idx in (index + 1 - self.period..=index).rev() {
            if idx == 0 {
                break;
            }
            let curr = &candles[idx];
            let prev = &candles[idx - 1];

            let up_move = curr.high - prev.high;
            let down_move = prev.low - curr.low;

            sum_tr += curr.true_range(Some(prev.close));
            if up_move > down_move && up_move > 0.0 {
                sum_plus_dm += up_move;
            }
            if down_move > up_move && down_move > 0.0 {
                sum_minus_dm += down_move;
            }
        }

        if sum_tr == 0.0 {
            sum_tr = 1.0;
        }

        let plus_di = 100.0 * sum_plus_dm / sum_tr;
        let minus_di = 100.0 * sum_minus_dm / sum_tr;
        let adx = 100.0 * (plus_di - minus_di).abs() / (plus_di + minus_di + Self::EPSILON);

        AdxOutput {
            adx,
            plus_di,
            minus_di,
        }
    }

    fn min_history(&self) -> usize {
        self.period * 2
    }

    fn name(&self) -> &str {
        "ADX"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending(n: usize, step: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let p = 100.0 + step * i as f64;
                Candle::new(i as i64, p, p + 1.0, p - 1.0, p, 10.0, i as i64)
            })
            .collect()
    }

    #[test]
    fn test_adx_strong_uptrend() {
        let adx = Adx::new(14);
        let out = adx.latest(&trending(40, 1.0));

        // Each bar: up move 1, down move -1, TR 2 -> DI+ = 50, DI- = 0
        assert!((out.plus_di - 50.0).abs() < 1e-10);
        assert_eq!(out.minus_di, 0.0);
        assert!(out.adx > 99.9);
        assert!(out.is_bullish());
    }

    #[test]
    fn test_adx_downtrend() {
        let adx = Adx::new(14);
        let out = adx.latest(&trending(40, -1.0));
        assert!(out.is_bearish());
        assert!(out.adx > 99.9);
    }

    #[test]
    fn test_adx_flat_series_guards_zero_range() {
        let adx = Adx::new(14);
        let flat: Vec<Candle> = (0..40).map(|i| Candle::from_price(100.0, i)).collect();
        let out = adx.latest(&flat);

        assert!(out.adx.is_finite());
        assert_eq!(out.adx, 0.0);
        assert_eq!(out.plus_di, 0.0);
    }

    #[test]
    fn test_adx_insufficient_history_is_neutral() {
        let adx = Adx::new(14);
        assert_eq!(adx.latest(&trending(27, 1.0)), AdxOutput::default());
        assert_eq!(adx.latest(&[]), AdxOutput::default());
        assert!(adx.latest(&trending(28, 1.0)).adx > 0.0);
    }
}
