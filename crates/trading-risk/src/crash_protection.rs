//! Crash protection overlay.
//!
//! Watches the close-to-close drop over a short span. A crash forces SELL
//! whatever the wrapped strategy said, unless RSI already reads oversold, in
//! which case it forces HOLD to avoid selling into the bounce.

use trading_core::error::StrategyError;
use trading_core::traits::Indicator;
use trading_core::types::{Candle, Signal};
use trading_indicators::Rsi;
use tracing::warn;

/// Candles needed before the overlay acts.
pub const CRASH_MIN_HISTORY: usize = 15;

/// Span of the drop measurement, in candles (current plus four before it).
pub const CRASH_SPAN: usize = 5;

/// RSI below this is treated as oversold.
pub const OVERSOLD_RSI: f64 = 25.0;

/// Crash protection overlay.
#[derive(Debug, Clone)]
pub struct CrashProtection {
    drop_threshold: f64,
    rsi: Rsi,
}

impl CrashProtection {
    /// Create a crash protection overlay.
    ///
    /// `drop_threshold` is fractional: 0.02 means a 2% drop.
    pub fn new(drop_threshold: f64) -> Result<Self, StrategyError> {
        if !(drop_threshold > 0.0 && drop_threshold < 1.0) {
            return Err(StrategyError::InvalidConfig(format!(
                "Crash drop threshold must be between 0 and 1, got {drop_threshold}"
            )));
        }
        Ok(Self {
            drop_threshold,
            rsi: Rsi::new(14),
        })
    }

    pub fn drop_threshold(&self) -> f64 {
        self.drop_threshold
    }

    /// Fractional drop of the newest close against the start of the span.
    ///
    /// Positive when price fell.
    pub fn drop(candles: &[Candle]) -> f64 {
        let Some(current) = candles.last() else {
            return 0.0;
        };
        let span = candles.len().min(CRASH_SPAN);
        let old = candles[candles.len() - span].close;
        if old <= 0.0 {
            return 0.0;
        }
        (old - current.close) / old
    }

    /// Transform the wrapped strategy's signal.
    pub fn apply(&self, candles: &[Candle], inner: Signal) -> Signal {
        if candles.len() < CRASH_MIN_HISTORY {
            return inner;
        }

        let drop = Self::drop(candles);
        if drop < self.drop_threshold {
            return inner;
        }

        let rsi = self.rsi.latest(candles);
        if rsi < OVERSOLD_RSI {
            warn!(
                drop_pct = drop * 100.0,
                rsi,
                "crash detected but RSI oversold, holding"
            );
            return Signal::Hold;
        }

        warn!(drop_pct = drop * 100.0, rsi, overridden = %inner, "crash protection selling");
        Signal::Sell
    }
}
