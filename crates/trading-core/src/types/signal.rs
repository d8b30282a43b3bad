//! Trading signals.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Side;

/// Discrete trading recommendation with five levels of conviction.
///
/// `Hold` is the neutral value and the only one an overlay may replace
/// without being a crash override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    Buy,
    #[default]
    Hold,
    Sell,
    StrongSell,
}

impl Signal {
    /// Check if this is the neutral signal.
    #[inline]
    pub fn is_hold(&self) -> bool {
        matches!(self, Signal::Hold)
    }

    /// Check if this signal opens or adds to a position.
    pub fn is_buy(&self) -> bool {
        matches!(self, Signal::StrongBuy | Signal::Buy)
    }

    /// Check if this signal reduces a position.
    pub fn is_sell(&self) -> bool {
        matches!(self, Signal::Sell | Signal::StrongSell)
    }

    /// Order side implied by the signal.
    pub fn side(&self) -> Side {
        match self {
            Signal::StrongBuy | Signal::Buy => Side::Buy,
            Signal::Hold => Side::Hold,
            Signal::Sell | Signal::StrongSell => Side::Sell,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::StrongBuy => "STRONG_BUY",
            Signal::Buy => "BUY",
            Signal::Hold => "HOLD",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG_SELL",
        };
        write!(f, "{}", s)
    }
}
