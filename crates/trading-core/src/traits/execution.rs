//! Order execution, balance and sizing traits.

use crate::error::ExecutionError;
use crate::types::{AccountSnapshot, ExecutionReceipt, Order, Signal};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for order executors.
///
/// Executors only ever receive non-hold orders. A rejection leaves the
/// account untouched.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    /// Execute an order at the given reference price.
    async fn execute(&self, order: &Order, price: Decimal)
        -> Result<ExecutionReceipt, ExecutionError>;

    /// Get the executor name.
    fn name(&self) -> &str;
}

/// Trait for account balance providers.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Get the current quote and base balances.
    async fn balances(&self) -> Result<AccountSnapshot, ExecutionError>;
}

/// Converts a signal into a concrete order.
///
/// Sizing is a pure function of its inputs: it never fails, it never
/// returns a negative quantity, and anything it cannot size becomes a hold.
pub trait OrderSizer: Send + Sync {
    /// Size an order for `symbol` at `price` against `account`.
    fn size(&self, symbol: &str, signal: Signal, price: Decimal, account: &AccountSnapshot)
        -> Order;
}
