//! Price feed trait definition.

use crate::error::FeedError;
use crate::types::Candle;
use async_trait::async_trait;

/// Trait for market data feeds.
///
/// A feed yields one candle per call. Raw-price feeds promote the price via
/// [`Candle::from_price`].
#[async_trait]
pub trait PriceFeed: Send {
    /// Fetch the next candle.
    ///
    /// Returns `FeedError::Exhausted` once a finite feed has no more data.
    async fn next_candle(&mut self) -> Result<Candle, FeedError>;

    /// Get the feed name.
    fn name(&self) -> &str;
}
