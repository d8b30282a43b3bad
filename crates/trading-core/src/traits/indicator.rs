//! Indicator trait definitions.

use crate::types::Candle;

/// Trait for technical indicators.
///
/// Indicators are stateless functions of a candle sequence evaluated at an
/// index. They are total: an empty sequence, an out-of-range index or
/// insufficient history yields the indicator's neutral value instead of an
/// error. Callers that need a meaningful value check [`Indicator::has_history`].
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Evaluate the indicator over `candles[..=index]`.
    fn value_at(&self, candles: &[Candle], index: usize) -> Self::Output;

    /// Evaluate the indicator at the newest candle.
    fn latest(&self, candles: &[Candle]) -> Self::Output {
        self.value_at(candles, candles.len().saturating_sub(1))
    }

    /// Get the minimum number of candles required for a meaningful value.
    fn min_history(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Check that there's enough data.
    fn has_history(&self, candles: &[Candle]) -> bool {
        candles.len() >= self.min_history()
    }
}
