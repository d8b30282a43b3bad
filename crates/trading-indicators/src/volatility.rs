//! Volatility indicators.

use trading_core::traits::Indicator;
use trading_core::types::Candle;

/// Average True Range (ATR).
///
/// Plain mean of the true ranges over the trailing window. Early in the series
/// the mean is taken over however many true ranges exist.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
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

impl Indicator for Atr {
    type Output = f64;

    fn value_at(&self, candles: &[Candle], index: usize) -> f64 {
        if index == 0 || index >= candles.len() {
            return 0.0;
        }

        let start = index.saturating_sub(self.period).max(1);
        let ranges: Vec<f64> = (start..=index)
            .map(|i| candles[i].true_range(Some(candles[i - 1].close)))
            .collect();

        ranges.iter().sum::<f64>() / ranges.len() as f64
    }

    fn min_history(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atr_constant_range() {
        let atr = Atr::new(14);
        let candles: Vec<Candle> = (0..30)
            .map(|i| Candle::new(i, 100.0, 102.0, 98.0, 100.0, 1.0, i))
            .collect();

        assert!((atr.latest(&candles) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_atr_uses_gap_from_previous_close() {
        let atr = Atr::new(1);
        let candles = vec![
            Candle::new(0, 100.0, 101.0, 99.0, 100.0, 1.0, 0),
            Candle::new(1, 110.0, 111.0, 109.0, 110.0, 1.0, 1),
        ];
        // |111 - 100| beats high - low
        assert!((atr.latest(&candles) - 11.0).abs() < 1e-10);
    }

    #[test]
    fn test_atr_short_history() {
        let atr = Atr::new(14);
        let candles = vec![
            Candle::new(0, 100.0, 101.0, 99.0, 100.0, 1.0, 0),
            Candle::new(1, 100.0, 103.0, 99.0, 100.0, 1.0, 1),
            Candle::new(2, 100.0, 101.0, 99.0, 100.0, 1.0, 2),
        ];
        // Mean of the two available ranges: (4 + 2) / 2
        assert!((atr.latest(&candles) - 3.0).abs() < 1e-10);
        assert_eq!(atr.latest(&candles[..1]), 0.0);
        assert_eq!(atr.latest(&[]), 0.0);
    }
}
