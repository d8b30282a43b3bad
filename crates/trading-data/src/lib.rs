//! Price-feed collaborators.
//!
//! - [`ReplayFeed`] replays an in-memory candle sequence
//! - [`CsvCandleFeed`] loads candles from CSV files into a replay feed
//! - [`BinanceFeed`] polls Binance's public REST endpoints

mod binance;
mod csv_source;
mod replay;

pub use binance::{parse_klines, parse_ticker, BinanceConfig, BinanceFeed, FeedKind, BINANCE_BASE_URL};
pub use csv_source::CsvCandleFeed;
pub use replay::ReplayFeed;
