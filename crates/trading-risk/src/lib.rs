//! Risk overlays and order sizing.
//!
//! Provides the overlay chain that can veto or escalate a base strategy's
//! signal (crash protection, high/low-risk breakout filters) and the sizer
//! that turns the final signal into an order.

mod breakout;
mod crash_protection;
mod overlay;
mod position_sizer;

pub use breakout::{BreakoutOverlay, RiskProfile};
pub use crash_protection::{CrashProtection, CRASH_MIN_HISTORY, CRASH_SPAN, OVERSOLD_RSI};
pub use overlay::{build_overlays, GuardedStrategy, Overlay, OverlayKind};
pub use position_sizer::{PositionSizer, SizingConfig};
