//! In-memory candle replay.

use async_trait::async_trait;
use std::collections::VecDeque;
use trading_core::error::FeedError;
use trading_core::traits::PriceFeed;
use trading_core::types::Candle;

/// Replays a fixed candle sequence, one per call, then reports exhaustion.
#[derive(Debug, Clone)]
pub struct ReplayFeed {
    name: String,
    candles: VecDeque<Candle>,
}

impl ReplayFeed {
    pub fn new(name: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            name: name.into(),
            candles: candles.into(),
        }
    }

    /// Candles not yet delivered.
    pub fn remaining(&self) -> usize {
        self.candles.len()
    }
}

#[async_trait]
impl PriceFeed for ReplayFeed {
    async fn next_candle(&mut self) -> Result<Candle, FeedError> {
        self.candles.pop_front().ok_or(FeedError::Exhausted)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
