//! Overlay composition.
//!
//! An overlay is a signal transform `(candles, inner signal) -> signal`. A
//! [`GuardedStrategy`] runs its base strategy and folds the overlays over
//! the result in list order, so the last overlay is the outermost and its
//! override wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use trading_core::error::StrategyError;
use trading_core::traits::Strategy;
use trading_core::types::{Candle, Signal};

use crate::breakout::BreakoutOverlay;
use crate::crash_protection::CrashProtection;

/// Serializable overlay selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayKind {
    /// Force SELL (or HOLD when oversold) on a sharp short-term drop
    CrashProtection { drop_threshold: f64 },
    /// Aggressive breakout/divergence entries on HOLD
    HighRisk,
    /// Conservative, fully-confirmed breakout entries on HOLD
    LowRisk,
}

impl OverlayKind {
    /// Build the overlay, validating its parameters.
    pub fn build(&self) -> Result<Overlay, StrategyError> {
        Ok(match self {
            OverlayKind::CrashProtection { drop_threshold } => {
                Overlay::CrashProtection(CrashProtection::new(*drop_threshold)?)
            }
            OverlayKind::HighRisk => Overlay::Breakout(BreakoutOverlay::high_risk()),
            OverlayKind::LowRisk => Overlay::Breakout(BreakoutOverlay::low_risk()),
        })
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayKind::CrashProtection { drop_threshold } => {
                write!(f, "Crash Protection ({:.1}%)", drop_threshold * 100.0)
            }
            OverlayKind::HighRisk => write!(f, "High Risk"),
            OverlayKind::LowRisk => write!(f, "Low Risk"),
        }
    }
}

/// A built overlay.
#[derive(Debug, Clone)]
pub enum Overlay {
    CrashProtection(CrashProtection),
    Breakout(BreakoutOverlay),
}

impl Overlay {
    /// Transform the inner signal.
    pub fn apply(&self, candles: &[Candle], inner: Signal) -> Signal {
        match self {
            Overlay::CrashProtection(overlay) => overlay.apply(candles, inner),
            Overlay::Breakout(overlay) => overlay.apply(candles, inner),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Overlay::CrashProtection(overlay) => {
                format!("Crash Protection ({:.1}%)", overlay.drop_threshold() * 100.0)
            }
            Overlay::Breakout(overlay) => overlay.name().to_string(),
        }
    }
}

/// Build every overlay in `kinds`, failing on the first invalid one.
pub fn build_overlays(kinds: &[OverlayKind]) -> Result<Vec<Overlay>, StrategyError> {
    kinds.iter().map(OverlayKind::build).collect()
}

/// A base strategy wrapped in an ordered overlay chain.
pub struct GuardedStrategy {
    base: Arc<dyn Strategy>,
    overlays: Vec<Overlay>,
    name: String,
}

impl GuardedStrategy {
    /// Wrap `base` with overlays built from `kinds`, innermost first.
    pub fn new(base: Arc<dyn Strategy>, kinds: &[OverlayKind]) -> Result<Self, StrategyError> {
        Ok(Self::with_overlays(base, build_overlays(kinds)?))
    }

    /// Wrap `base` with already-built overlays, innermost first.
    pub fn with_overlays(base: Arc<dyn Strategy>, overlays: Vec<Overlay>) -> Self {
        let name = std::iter::once(base.name().to_string())
            .chain(overlays.iter().map(Overlay::name))
            .collect::<Vec<_>>()
            .join(" + ");

        Self {
            base,
            overlays,
            name,
        }
    }

    /// The undecorated strategy.
    pub fn base(&self) -> &Arc<dyn Strategy> {
        &self.base
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }
}

impl Strategy for GuardedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        self.base.description()
    }

    fn generate_signal(&self, candles: &[Candle]) -> Signal {
        let base_signal = self.base.generate_signal(candles);
        self.overlays
            .iter()
            .fold(base_signal, |signal, overlay| overlay.apply(candles, signal))
    }

    fn min_history(&self) -> usize {
        self.base.min_history()
    }
}
