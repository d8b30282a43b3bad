//! Signal engine and trading pipeline.
//!
//! Ties the strategy catalog and the overlay chain together:
//! - [`RegimeSelector`] picks the base strategy from the market regime
//! - [`SignalEngine`] applies the current [`StrategySetup`] to a candle window
//! - [`TradingPipeline`] drives fetch, evaluate, size, execute and record

mod pipeline;
mod regime;
mod setup;

pub use pipeline::{PipelineConfig, RunSummary, Stage, TickError, TickReport, TradingPipeline};
pub use regime::{RegimeConfig, RegimeSelector, RegimeTransition};
pub use setup::{BaseSelection, Evaluation, SetupHandle, SignalEngine, StrategySetup};
