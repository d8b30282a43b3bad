//! Moving average indicators.

use trading_core::traits::Indicator;
use trading_core::types::Candle;

/// Simple Moving Average (SMA).
///
/// Arithmetic mean of the last N closes ending at the evaluated index.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    type Output = f64;

    /// Returns 0 when fewer than `period` closes end at `index`.
    fn value_at(&self, candles: &[Candle], index: usize) -> f64 {
        if index >= candles.len() || index + 1 < self.period {
            return 0.0;
        }

        let start = index + 1 - self.period;
        let sum: f64 = candles[start..=index].iter().map(|c| c.close).sum();
        sum / self.period as f64
    }

    fn min_history(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Evaluated on demand from an anchor `max(0, index - 4 * period)`: the close
/// at the anchor seeds the average, which is then smoothed forward with
/// `k = 2 / (period + 1)` up to `index`. With little history the result is
/// close to the anchor close; callers guard their own minimum history.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
}

impl Ema {
    /// Number of periods replayed before the evaluated index.
    pub const ANCHOR_PERIODS: usize = 4;

    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        let multiplier = 2.0 / (period as f64 + 1.0);
        Self { period, multiplier }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Index of the candle that seeds the average.
    pub fn anchor(&self, index: usize) -> usize {
        index.saturating_sub(self.period * Self::ANCHOR_PERIODS)
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn value_at(&self, candles: &[Candle], index: usize) -> f64 {
        if index >= candles.len() {
            return 0.0;
        }

        let start = self.anchor(index);
        let one_minus_mult = 1.0 - self.multiplier;

        candles[start + 1..=index]
            .iter()
            .fold(candles[start].close, |ema, c| {
                c.close * self.multiplier + ema * one_minus_mult
            })
    }

    fn min_history(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EMA"
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
    fn test_sma() {
        let sma = Sma::new(3);
        let data = candles(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert!((sma.value_at(&data, 2) - 2.0).abs() < 1e-10); // (1+2+3)/3
        assert!((sma.value_at(&data, 3) - 3.0).abs() < 1e-10); // (2+3+4)/3
        assert!((sma.latest(&data) - 4.0).abs() < 1e-10); // (3+4+5)/3
    }

    #[test]
    fn test_sma_insufficient_data() {
        let sma = Sma::new(5);
        let data = candles(&[1.0, 2.0, 3.0]);

        assert_eq!(sma.latest(&data), 0.0);
        assert_eq!(sma.latest(&[]), 0.0);
        assert_eq!(sma.value_at(&data, 10), 0.0);
    }

    #[test]
    fn test_ema() {
        let ema = Ema::new(3);
        let data = candles(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        // mult = 2/(3+1) = 0.5, seeded with the first close
        // 1 -> 1.5 -> 2.25 -> 3.125 -> 4.0625
        assert!((ema.value_at(&data, 0) - 1.0).abs() < 1e-10);
        assert!((ema.value_at(&data, 1) - 1.5).abs() < 1e-10);
        assert!((ema.latest(&data) - 4.0625).abs() < 1e-10);
    }

    #[test]
    fn test_ema_anchor_limits_replay() {
        let ema = Ema::new(2);
        assert_eq!(ema.anchor(5), 0);
        assert_eq!(ema.anchor(20), 12);

        // Everything before the anchor is ignored.
        let mut closes = vec![1_000.0; 12];
        closes.extend(std::iter::repeat(10.0).take(9));
        let data = candles(&closes);
        assert!((ema.latest(&data) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_flat_series() {
        let ema = Ema::new(12);
        let data = candles(&[100.0; 60]);
        assert!((ema.latest(&data) - 100.0).abs() < 1e-10);
    }
}
