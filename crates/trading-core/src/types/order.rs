//! Orders, account snapshots and execution records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
    /// No-op; never sent to an executor
    #[default]
    Hold,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
            Side::Hold => write!(f, "HOLD"),
        }
    }
}

/// A sized order for one symbol.
///
/// Quantity is in base-asset units, never negative, and always zero for
/// `Side::Hold`. The constructors enforce both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Symbol to trade
    pub symbol: String,
    /// Buy, sell or hold
    pub side: Side,
    /// Quantity in base-asset units
    pub quantity: Decimal,
}

impl Order {
    /// Create an order. A non-positive quantity collapses to a hold.
    pub fn new(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        if side == Side::Hold || quantity <= Decimal::ZERO {
            return Self::hold(symbol);
        }
        Self {
            symbol: symbol.into(),
            side,
            quantity,
        }
    }

    /// Create a zero-quantity no-op order.
    pub fn hold(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            side: Side::Hold,
            quantity: Decimal::ZERO,
        }
    }

    /// Check if this order is a no-op.
    pub fn is_hold(&self) -> bool {
        self.side == Side::Hold
    }

    /// Notional value at the given price, or `None` if it overflows.
    pub fn notional(&self, price: Decimal) -> Option<Decimal> {
        self.quantity.checked_mul(price)
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.side, self.quantity, self.symbol)
    }
}

/// Read-only view of the account balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AccountSnapshot {
    /// Quote-asset balance (e.g. USDT)
    pub quote: Decimal,
    /// Base-asset balance (e.g. BTC)
    pub base: Decimal,
}

impl AccountSnapshot {
    pub fn new(quote: Decimal, base: Decimal) -> Self {
        Self { quote, base }
    }

    /// Total value in quote units at the given price, or `None` if it
    /// overflows.
    pub fn equity(&self, price: Decimal) -> Option<Decimal> {
        self.base.checked_mul(price)?.checked_add(self.quote)
    }
}

/// Acknowledgement returned by an executor for a filled order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    /// Executor-assigned identifier
    pub id: Uuid,
    /// The order as executed
    pub order: Order,
    /// Fill price
    pub price: Decimal,
    /// Fill time
    pub executed_at: DateTime<Utc>,
}

/// One row of the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub quote_balance: Decimal,
    pub base_balance: Decimal,
}

impl ExecutionRecord {
    /// Build a record from an order and the balances after execution.
    pub fn new(order: &Order, price: Decimal, balances: AccountSnapshot) -> Self {
        Self {
            timestamp: Utc::now(),
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            price,
            quote_balance: balances.quote,
            base_balance: balances.base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_hold_order_has_zero_quantity() {
        let order = Order::new("BTCUSDT", Side::Hold, dec!(3));
        assert!(order.is_hold());
        assert_eq!(order.quantity, Decimal::ZERO);
    }

    #[test]
    fn test_non_positive_quantity_collapses_to_hold() {
        assert!(Order::new("BTCUSDT", Side::Buy, Decimal::ZERO).is_hold());
        assert!(Order::new("BTCUSDT", Side::Sell, dec!(-1)).is_hold());

        let order = Order::new("BTCUSDT", Side::Sell, dec!(0.25));
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.notional(dec!(100)), Some(dec!(25)));
    }

    #[test]
    fn test_order_display() {
        let order = Order::new("BTCUSDT", Side::Buy, dec!(0.5));
        assert_eq!(order.to_string(), "BUY 0.5 BTCUSDT");
    }

    #[test]
    fn test_notional_overflow_is_none() {
        let order = Order::new("BTCUSDT", Side::Buy, Decimal::MAX);
        assert_eq!(order.notional(dec!(2)), None);
        assert_eq!(AccountSnapshot::new(Decimal::ZERO, Decimal::MAX).equity(dec!(2)), None);
    }

    #[test]
    fn test_account_equity() {
        let account = AccountSnapshot::new(dec!(1000), dec!(0.5));
        assert_eq!(account.equity(dec!(200)), Some(dec!(1100)));
    }
}
