//! Property tests for calculation invariants.
//!
//! Uses proptest to verify:
//! 1. Flat trades — exit == entry gives zero P&L and zero excursion
//! 2. Direction symmetry — long P&L is the negation of short P&L
//! 3. Investment — non-negative and independent of direction
//! 4. Percentage sign — never opposite to the P&L sign
//! 5. Excursion shape — runup ≥ 0, drawdown ≤ 0, at most one non-zero
//! 6. Futures quantization — P&L is a whole multiple of the tick value

use chrono::NaiveDate;
use proptest::prelude::*;
use tradelab_core::{
    compute_excursion, compute_investment, compute_profit_loss, Direction, Market, TickTable,
    TradeCalculator, TradeEntry, TradeFields,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..5000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_quantity() -> impl Strategy<Value = f64> {
    prop_oneof![(1..1000_i64).prop_map(|q| q as f64), (-1000..-1_i64).prop_map(|q| q as f64)]
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Long), Just(Direction::Short)]
}

fn arb_market() -> impl Strategy<Value = Market> {
    prop_oneof![
        Just(Market::Stocks),
        Just(Market::Options),
        Just(Market::Futures),
        Just(Market::Forex),
        Just(Market::Crypto),
    ]
}

fn arb_futures_root() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("ES"), Just("NQ"), Just("CL"), Just("GC"), Just("ZN"), Just("6E")]
}

fn entry(
    symbol: &str,
    market: Market,
    direction: Direction,
    entry_price: f64,
    exit_price: Option<f64>,
    quantity: f64,
) -> TradeEntry {
    TradeEntry::new(TradeFields {
        date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        symbol: symbol.into(),
        market,
        direction,
        entry_price,
        exit_price,
        quantity,
        notes: None,
    })
    .unwrap()
}

proptest! {
    /// exit == entry: no P&L and no excursion, for every market and direction.
    #[test]
    fn flat_trade_is_zero(
        price in arb_price(),
        qty in arb_quantity(),
        direction in arb_direction(),
        market in arb_market(),
        root in arb_futures_root(),
    ) {
        let calc = TradeCalculator::with_default_ticks();
        let e = entry(root, market, direction, price, Some(price), qty);
        let metrics = calc.metrics(&e).unwrap();
        prop_assert_eq!(metrics.profit_loss, Some(0.0));
        prop_assert_eq!(metrics.max_runup, Some(0.0));
        prop_assert_eq!(metrics.max_drawdown, Some(0.0));
    }

    /// Generic path: long and short P&L are exact negations.
    #[test]
    fn long_is_negated_short(
        entry_price in arb_price(),
        exit_price in arb_price(),
        qty in arb_quantity(),
    ) {
        let ticks = TickTable::with_defaults();
        let long = entry("AAPL", Market::Stocks, Direction::Long, entry_price, Some(exit_price), qty);
        let short = entry("AAPL", Market::Stocks, Direction::Short, entry_price, Some(exit_price), qty);
        let long_pnl = compute_profit_loss(&long, &ticks).unwrap();
        let short_pnl = compute_profit_loss(&short, &ticks).unwrap();
        prop_assert_eq!(long_pnl, -short_pnl);
        let expected = ((exit_price - entry_price) * qty.abs() * 100.0).round() / 100.0;
        prop_assert!((long_pnl - expected).abs() < 1e-9);
    }

    /// Investment is non-negative and ignores direction and quantity sign.
    #[test]
    fn investment_is_direction_independent(
        entry_price in arb_price(),
        exit_price in arb_price(),
        qty in arb_quantity(),
    ) {
        let calc = TradeCalculator::with_default_ticks();
        let long = entry("SPY", Market::Stocks, Direction::Long, entry_price, Some(exit_price), qty);
        let short = entry("SPY", Market::Stocks, Direction::Short, entry_price, Some(exit_price), -qty);
        let long_inv = calc.metrics(&long).unwrap().investment;
        prop_assert!(long_inv >= 0.0);
        prop_assert_eq!(long_inv, calc.metrics(&short).unwrap().investment);
        prop_assert_eq!(Ok(long_inv), compute_investment(entry_price, qty));
    }

    /// Percentage never has the opposite sign of P&L.
    #[test]
    fn percentage_sign_follows_pnl(
        entry_price in arb_price(),
        exit_price in arb_price(),
        qty in arb_quantity(),
        direction in arb_direction(),
        market in arb_market(),
        root in arb_futures_root(),
    ) {
        let calc = TradeCalculator::with_default_ticks();
        let e = entry(root, market, direction, entry_price, Some(exit_price), qty);
        let metrics = calc.metrics(&e).unwrap();
        let pnl = metrics.profit_loss.unwrap();
        let pct = metrics.profit_loss_percentage.unwrap();
        prop_assert!(metrics.investment > 0.0);
        prop_assert!(pnl * pct >= 0.0, "pnl {} pct {}", pnl, pct);
        if pnl == 0.0 {
            prop_assert_eq!(pct, 0.0);
        }
    }

    /// Runup is non-negative, drawdown non-positive, never both non-zero.
    #[test]
    fn excursion_shape(
        entry_price in arb_price(),
        exit_price in arb_price(),
        qty in arb_quantity(),
        direction in arb_direction(),
    ) {
        let e = entry("QQQ", Market::Stocks, direction, entry_price, Some(exit_price), qty);
        let exc = compute_excursion(&e).unwrap();
        prop_assert!(exc.max_runup >= 0.0);
        prop_assert!(exc.max_drawdown <= 0.0);
        prop_assert!(exc.max_runup == 0.0 || exc.max_drawdown == 0.0);
    }

    /// Futures P&L is always a whole number of ticks × tick value × contracts.
    #[test]
    fn futures_pnl_is_whole_ticks(
        entry_price in arb_price(),
        exit_price in arb_price(),
        contracts in 1..20_i64,
        direction in arb_direction(),
        root in arb_futures_root(),
    ) {
        let ticks = TickTable::with_defaults();
        let spec = *ticks.get(root).unwrap();
        let e = entry(root, Market::Futures, direction, entry_price, Some(exit_price), contracts as f64);
        let pnl = compute_profit_loss(&e, &ticks).unwrap();
        let per_tick = spec.tick_value * contracts as f64;
        let ticks_moved = pnl / per_tick;
        // P&L is rounded to cents, so allow a cent of slack per tick multiple
        prop_assert!(
            (ticks_moved - ticks_moved.round()).abs() * per_tick <= 0.01,
            "pnl {} is not a multiple of {}", pnl, per_tick
        );
    }
}
