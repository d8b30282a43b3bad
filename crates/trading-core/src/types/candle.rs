//! Candle (OHLCV) data and the bounded rolling window fed to strategies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::FeedError;

/// Default number of candles retained by a [`CandleWindow`].
pub const DEFAULT_WINDOW_CAPACITY: usize = 500;

/// A single OHLCV candle.
///
/// Uses f64 for fast indicator calculations. Immutable once appended to a
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time (Unix milliseconds)
    pub open_time: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: f64,
    /// Close time (Unix milliseconds)
    pub close_time: i64,
}

impl Candle {
    /// Create a new candle.
    pub fn new(
        open_time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        close_time: i64,
    ) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
        }
    }

    /// Promote a raw last-trade price to a synthetic candle.
    ///
    /// All four prices equal `price` and the volume is zero.
    pub fn from_price(price: f64, timestamp: i64) -> Self {
        Self::new(timestamp, price, price, price, price, 0.0, timestamp)
    }

    /// Check that the candle can be safely appended to a window.
    pub fn validate(&self) -> Result<(), FeedError> {
        let fields = [self.open, self.high, self.low, self.close, self.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(FeedError::Malformed("non-finite price or volume".into()));
        }
        if self.close <= 0.0 {
            return Err(FeedError::Malformed(format!(
                "non-positive close {}",
                self.close
            )));
        }
        if self.volume < 0.0 {
            return Err(FeedError::Malformed(format!(
                "negative volume {}",
                self.volume
            )));
        }
        if self.high < self.low {
            return Err(FeedError::Malformed(format!(
                "high {} below low {}",
                self.high, self.low
            )));
        }
        if self.close_time < self.open_time {
            return Err(FeedError::Malformed(format!(
                "close time {} before open time {}",
                self.close_time, self.open_time
            )));
        }
        Ok(())
    }

    /// Calculate the true range against the previous candle's close.
    #[inline]
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }

    /// Get the open time as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.open_time).unwrap_or_default()
    }
}

/// Append-only, capacity-bounded window of candles for one trading instance.
///
/// The oldest candle is evicted when a push would exceed the capacity.
/// Storage is kept contiguous so strategies can index a plain slice.
#[derive(Debug, Clone)]
pub struct CandleWindow {
    symbol: String,
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleWindow {
    /// Create an empty window with the default capacity.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_capacity(symbol, DEFAULT_WINDOW_CAPACITY)
    }

    /// Create an empty window holding at most `capacity` candles.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(symbol: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            symbol: symbol.into(),
            candles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a candle, evicting the oldest one if the window is full.
    ///
    /// Malformed or out-of-order candles are rejected and the window is left
    /// unchanged.
    pub fn push(&mut self, candle: Candle) -> Result<(), FeedError> {
        candle.validate()?;
        if let Some(last) = self.candles.back() {
            if candle.open_time < last.open_time {
                return Err(FeedError::OutOfOrder {
                    open_time: candle.open_time,
                    last_open_time: last.open_time,
                });
            }
        }

        if self.candles.len() >= self.capacity {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
        self.candles.make_contiguous();
        Ok(())
    }

    /// All candles, oldest first.
    pub fn candles(&self) -> &[Candle] {
        // Every mutation ends with `make_contiguous`, so the first slice holds
        // the whole window.
        self.candles.as_slices().0
    }

    /// Get the newest candle.
    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Get the number of candles.
    #[inline]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Check if the window is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Maximum number of candles retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Symbol this window tracks.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn candle(ts: i64, close: f64) -> Candle {
        Candle::new(ts, close, close + 1.0, close - 1.0, close, 1000.0, ts + 59_999)
    }

    #[test]
    fn test_true_range() {
        let c = Candle::new(0, 100.0, 110.0, 95.0, 105.0, 1.0, 1);

        assert!((c.true_range(None) - 15.0).abs() < 1e-10);
        // Gap down from previous close of 120
        assert!((c.true_range(Some(120.0)) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_from_price() {
        let c = Candle::from_price(42_000.5, 1_700_000_000_000);
        assert_eq!(c.open, 42_000.5);
        assert_eq!(c.low, c.high);
        assert_eq!(c.volume, 0.0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed() {
        assert!(Candle::from_price(0.0, 0).validate().is_err());
        assert!(Candle::from_price(f64::NAN, 0).validate().is_err());
        assert!(Candle::new(0, 1.0, 0.5, 1.0, 1.0, 1.0, 0).validate().is_err());
        assert!(Candle::new(10, 1.0, 1.0, 1.0, 1.0, 1.0, 5).validate().is_err());
        assert!(Candle::new(0, 1.0, 1.0, 1.0, 1.0, -1.0, 0).validate().is_err());
    }

    #[test]
    fn test_window_capacity() {
        let mut window = CandleWindow::with_capacity("BTCUSDT", 3);

        for i in 0..3 {
            window.push(candle(i, 100.0 + i as f64)).unwrap();
        }
        assert_eq!(window.len(), 3);

        window.push(candle(3, 103.0)).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window.candles()[0].open_time, 1);
        assert_eq!(window.last().unwrap().open_time, 3);
    }

    #[test]
    fn test_window_rejects_bad_candle_without_mutation() {
        let mut window = CandleWindow::with_capacity("BTCUSDT", 3);
        window.push(candle(5, 100.0)).unwrap();

        assert!(window.push(Candle::from_price(-1.0, 6)).is_err());
        assert!(matches!(
            window.push(candle(4, 101.0)),
            Err(FeedError::OutOfOrder { .. })
        ));
        assert_eq!(window.len(), 1);
        assert_eq!(window.closes(), vec![100.0]);

        // Same open time is a repeated poll of a forming candle
        assert!(window.push(candle(5, 100.5)).is_ok());
    }

    proptest! {
        #[test]
        fn prop_window_never_exceeds_capacity(
            capacity in 1usize..40,
            closes in proptest::collection::vec(1.0f64..1000.0, 0..200),
        ) {
            let mut window = CandleWindow::with_capacity("TEST", capacity);
            for (i, close) in closes.iter().enumerate() {
                window.push(candle(i as i64, *close)).unwrap();
                prop_assert!(window.len() <= capacity);
                prop_assert_eq!(window.candles().len(), window.len());
                prop_assert_eq!(window.last().map(|c| c.close), Some(*close));
            }
        }
    }
}
