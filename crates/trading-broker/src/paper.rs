//! Simulated quote/base wallet for paper trading.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::Mutex;
use trading_core::error::ExecutionError;
use trading_core::traits::{BalanceSource, OrderExecutor};
use trading_core::types::{AccountSnapshot, ExecutionReceipt, Order, Side};
use tracing::debug;
use uuid::Uuid;

/// Paper ledger acting as both execution and balance collaborator.
///
/// Fills every order at the given price. Clones share the same wallet.
#[derive(Debug, Clone)]
pub struct PaperLedger {
    account: Arc<Mutex<AccountSnapshot>>,
    base_asset: String,
    quote_asset: String,
}

impl PaperLedger {
    /// Default starting quote balance.
    pub const INITIAL_QUOTE: Decimal = dec!(1000);

    /// Create a ledger with the given starting balances.
    pub fn new(initial: AccountSnapshot) -> Self {
        Self {
            account: Arc::new(Mutex::new(initial)),
            base_asset: "BTC".into(),
            quote_asset: "USDT".into(),
        }
    }

    /// Set the asset names used in error messages.
    pub fn with_assets(mut self, base: impl Into<String>, quote: impl Into<String>) -> Self {
        self.base_asset = base.into();
        self.quote_asset = quote.into();
        self
    }

    /// Current balances.
    pub async fn snapshot(&self) -> AccountSnapshot {
        *self.account.lock().await
    }
}

impl Default for PaperLedger {
    fn default() -> Self {
        Self::new(AccountSnapshot::new(Self::INITIAL_QUOTE, Decimal::ZERO))
    }
}

#[async_trait]
impl OrderExecutor for PaperLedger {
    async fn execute(&self, order: &Order, price: Decimal) -> Result<ExecutionReceipt, ExecutionError> {
        if price <= Decimal::ZERO {
            return Err(ExecutionError::Rejected(format!("invalid price {price}")));
        }

        let mut account = self.account.lock().await;
        match order.side {
            Side::Buy => {
                let cost = order.notional(price).ok_or_else(|| {
                    ExecutionError::Rejected(format!("notional of {order} at {price} overflows"))
                })?;
                if cost > account.quote {
                    return Err(ExecutionError::InsufficientFunds {
                        asset: self.quote_asset.clone(),
                        required: cost,
                        available: account.quote,
                    });
                }
                let base = account.base.checked_add(order.quantity).ok_or_else(|| {
                    ExecutionError::Rejected(format!("{} balance overflows", self.base_asset))
                })?;
                account.quote -= cost;
                account.base = base;
            }
            Side::Sell => {
                if order.quantity > account.base {
                    return Err(ExecutionError::InsufficientFunds {
                        asset: self.base_asset.clone(),
                        required: order.quantity,
                        available: account.base,
                    });
                }
                let proceeds = order
                    .notional(price)
                    .and_then(|notional| notional.checked_add(account.quote))
                    .ok_or_else(|| {
                        ExecutionError::Rejected(format!("proceeds of {order} at {price} overflow"))
                    })?;
                account.base -= order.quantity;
                account.quote = proceeds;
            }
            Side::Hold => {
                return Err(ExecutionError::Rejected("HOLD orders are not executable".into()));
            }
        }

        debug!(order = %order, %price, quote = %account.quote, base = %account.base, "paper fill");

        Ok(ExecutionReceipt {
            id: Uuid::new_v4(),
            order: order.clone(),
            price,
            executed_at: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        "paper"
    }
}

#[async_trait]
impl BalanceSource for PaperLedger {
    async fn balances(&self) -> Result<AccountSnapshot, ExecutionError> {
        Ok(self.snapshot().await)
    }
}
