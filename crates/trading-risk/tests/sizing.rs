//! Property tests for order sizing.

use proptest::prelude::*;
use rust_decimal::Decimal;
use trading_core::traits::OrderSizer;
use trading_core::types::{AccountSnapshot, Side, Signal};
use trading_risk::PositionSizer;

fn signal() -> impl Strategy<Value = Signal> {
    prop_oneof![
        Just(Signal::StrongBuy),
        Just(Signal::Buy),
        Just(Signal::Hold),
        Just(Signal::Sell),
        Just(Signal::StrongSell),
    ]
}

/// Decimal with two fractional digits in `[0, max)`.
fn amount(max: i64) -> impl Strategy<Value = Decimal> {
    (0..max * 100).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #[test]
    fn sized_orders_stay_within_balances(
        signal in signal(),
        price in amount(100_000),
        quote in amount(1_000_000),
        base in amount(1_000),
    ) {
        let sizer = PositionSizer::default();
        let account = AccountSnapshot::new(quote, base);
        let order = sizer.size("BTCUSDT", signal, price, &account);

        prop_assert!(order.quantity >= Decimal::ZERO);
        prop_assert_eq!(order.quantity.is_zero(), order.side == Side::Hold);

        match order.side {
            Side::Buy => {
                prop_assert!(signal.is_buy());
                prop_assert!(order.notional(price).unwrap() <= quote);
                prop_assert!(order.notional(price).unwrap() >= sizer.config().min_notional);
            }
            Side::Sell => {
                prop_assert!(signal.is_sell());
                prop_assert!(order.quantity <= base);
                prop_assert!(order.notional(price).unwrap() >= sizer.config().min_notional);
            }
            Side::Hold => {}
        }
    }

    #[test]
    fn hold_signal_never_trades(
        price in amount(100_000),
        quote in amount(1_000_000),
        base in amount(1_000),
    ) {
        let sizer = PositionSizer::default();
        let order = sizer.size("BTCUSDT", Signal::Hold, price, &AccountSnapshot::new(quote, base));
        prop_assert!(order.is_hold());
    }
}

#[test]
fn near_zero_price_sizes_without_overflow() {
    let sizer = PositionSizer::default();
    let account = AccountSnapshot::new(Decimal::new(1000, 0), Decimal::ZERO);
    let price = Decimal::try_from(1e-26).unwrap();
    assert!(price > Decimal::ZERO);

    // 980 / 1e-26 does not fit in a Decimal
    let order = sizer.size("X", Signal::StrongBuy, price, &account);
    assert!(order.is_hold());
    assert_eq!(order.quantity, Decimal::ZERO);

    // 400 / 1e-26 still fits
    let order = sizer.size("X", Signal::Buy, price, &account);
    assert_eq!(order.side, Side::Buy);
    assert!(order.notional(price).unwrap() <= account.quote);
}
