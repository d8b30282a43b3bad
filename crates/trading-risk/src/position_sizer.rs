//! Signal-tier order sizing.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trading_core::error::TradingError;
use trading_core::traits::OrderSizer;
use trading_core::types::{AccountSnapshot, Order, Side, Signal};
use tracing::debug;

/// Fractions of the account committed per signal, plus the notional floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Fraction of the quote balance spent on STRONG_BUY
    pub strong_buy_fraction: Decimal,
    /// Fraction of the quote balance spent on BUY
    pub buy_fraction: Decimal,
    /// Fraction of the base balance sold on STRONG_SELL
    pub strong_sell_fraction: Decimal,
    /// Fraction of the base balance sold on SELL
    pub sell_fraction: Decimal,
    /// Orders below this quote value become HOLD
    pub min_notional: Decimal,
    /// Decimal places kept in the quantity (rounded toward zero)
    pub quantity_precision: u32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            strong_buy_fraction: dec!(0.98),
            buy_fraction: dec!(0.40),
            strong_sell_fraction: dec!(1.0),
            sell_fraction: dec!(0.50),
            min_notional: dec!(5.0),
            quantity_precision: 8,
        }
    }
}

impl SizingConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), TradingError> {
        let fractions = [
            ("strong_buy_fraction", self.strong_buy_fraction),
            ("buy_fraction", self.buy_fraction),
            ("strong_sell_fraction", self.strong_sell_fraction),
            ("sell_fraction", self.sell_fraction),
        ];
        for (name, value) in fractions {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(TradingError::Config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if self.min_notional <= Decimal::ZERO {
            return Err(TradingError::Config(
                "min_notional must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Maps a signal to an order against the current balances.
///
/// Buys spend a fraction of the quote balance, sells release a fraction of
/// the base balance. Anything below the minimum notional, or sized against a
/// non-positive price, becomes a HOLD.
#[derive(Debug, Clone, Default)]
pub struct PositionSizer {
    config: SizingConfig,
}

impl PositionSizer {
    /// Create a new position sizer.
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// Raw quantity in base units before the notional filter.
    ///
    /// `None` when the quantity does not fit in a `Decimal`, e.g. a buy
    /// against a price close to zero.
    pub fn quantity(
        &self,
        signal: Signal,
        price: Decimal,
        account: &AccountSnapshot,
    ) -> Option<Decimal> {
        if price <= Decimal::ZERO {
            return Some(Decimal::ZERO);
        }

        let raw = match signal {
            Signal::StrongBuy => account
                .quote
                .checked_mul(self.config.strong_buy_fraction)?
                .checked_div(price)?,
            Signal::Buy => account
                .quote
                .checked_mul(self.config.buy_fraction)?
                .checked_div(price)?,
            Signal::StrongSell => account.base.checked_mul(self.config.strong_sell_fraction)?,
            Signal::Sell => account.base.checked_mul(self.config.sell_fraction)?,
            Signal::Hold => Decimal::ZERO,
        };

        Some(
            raw.max(Decimal::ZERO)
                .round_dp_with_strategy(self.config.quantity_precision, RoundingStrategy::ToZero),
        )
    }
}

impl OrderSizer for PositionSizer {
    fn size(
        &self,
        symbol: &str,
        signal: Signal,
        price: Decimal,
        account: &AccountSnapshot,
    ) -> Order {
        let side = signal.side();
        if side == Side::Hold {
            return Order::hold(symbol);
        }

        let sized = self
            .quantity(signal, price, account)
            .and_then(|quantity| Some((quantity, quantity.checked_mul(price)?)));
        let Some((quantity, notional)) = sized else {
            debug!(%signal, %price, "order size overflows, holding");
            return Order::hold(symbol);
        };
        if notional < self.config.min_notional {
            debug!(
                %signal,
                %quantity,
                %notional,
                min_notional = %self.config.min_notional,
                "order below minimum notional, holding"
            );
            return Order::hold(symbol);
        }

        Order::new(symbol, side, quantity)
    }
}
