//! Core data types for the trading system.

mod candle;
mod order;
mod signal;
mod timeframe;

pub use candle::{Candle, CandleWindow, DEFAULT_WINDOW_CAPACITY};
pub use order::{AccountSnapshot, ExecutionReceipt, ExecutionRecord, Order, Side};
pub use signal::Signal;
pub use timeframe::Timeframe;
