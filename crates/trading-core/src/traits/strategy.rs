//! Strategy trait definitions.

use crate::error::StrategyError;
use crate::types::{Candle, Signal};

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Core strategy trait.
///
/// A strategy maps a candle history (oldest first, newest last) to exactly
/// one [`Signal`]. Implementations hold no per-call state, so evaluating the
/// same history twice yields the same signal, and any history shorter than
/// [`Strategy::min_history`] yields `Signal::Hold`.
pub trait Strategy: Send + Sync {
    /// Get the display name of this strategy.
    fn name(&self) -> &str;

    /// Evaluate the candle history and produce a signal.
    fn generate_signal(&self, candles: &[Candle]) -> Signal;

    /// Get the number of candles needed before generating non-HOLD signals.
    fn min_history(&self) -> usize;

    /// Check if there is enough history to evaluate.
    fn is_warmed_up(&self, candles_available: usize) -> bool {
        candles_available >= self.min_history()
    }

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}
