//! Technical indicators over candle sequences.
//!
//! Every indicator is a stateless function of a candle slice evaluated at an
//! index:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD)
//! - Trend strength (ADX with +DI/-DI)
//! - Volatility (ATR)
//!
//! Short or empty input yields a neutral value rather than an error.

pub mod momentum;
pub mod moving_average;
pub mod trend;
pub mod volatility;

pub use momentum::{Macd, MacdOutput, Rsi};
pub use moving_average::{Ema, Sma};
pub use trend::{Adx, AdxOutput};
pub use volatility::Atr;
