//! End-to-end scenarios through the exchange entry point.
//!
//! Every test starts from the same book: five buys and five sells around a
//! reference market price of 15_000, entered through the full pipeline so
//! their reservations are real.
//!
//! ```text
//!   id  BUY qty @ price      id  SELL qty @ price
//!    1      304 @ 15_700      6      350 @ 15_800
//!    2       43 @ 15_500      7      285 @ 15_810
//!    3      445 @ 15_450      8      800 @ 15_810
//!    4      526 @ 15_450      9      340 @ 15_820
//!    5    1_000 @ 15_400     10       65 @ 15_820
//! ```

use matchbook::error::{RejectReason, ValidationError};
use matchbook::ledger::{Broker, Shareholder};
use matchbook::types::{DeleteOrderRq, EnterOrderRq, Event, Side, TradeSummary};
use matchbook::{EngineConfig, Exchange};

const ISIN: &str = "ABC";

/// Owner of the seeded book
const RICH: u64 = 1;

/// Broker with almost no credit, shareholder with no shares
const POOR: u64 = 2;

const RICH_CREDIT: u64 = 100_000_000;
const RICH_POSITION: u64 = 100_000;
const POOR_CREDIT: u64 = 1_000;

// ============================================================================
// Helpers
// ============================================================================

fn new_order(id: u64, side: Side, quantity: i64, price: i64) -> EnterOrderRq {
    EnterOrderRq::new_order(id, ISIN, id, side, quantity, price, RICH, RICH)
}

fn update(request_id: u64, order_id: u64, side: Side, quantity: i64, price: i64) -> EnterOrderRq {
    EnterOrderRq::update_order(request_id, ISIN, order_id, side, quantity, price, RICH, RICH)
}

fn accepted(id: u64) -> Event {
    Event::OrderAccepted { request_id: id, order_id: id }
}

fn activated(id: u64) -> Event {
    Event::OrderActivated { order_id: id }
}

/// `OrderExecuted` for the incoming order, then one `Trade` per fill.
/// Fills are `(price, quantity, counter_order_id)`.
fn executed(request_id: u64, order_id: u64, side: Side, fills: &[(u64, u64, u64)]) -> Vec<Event> {
    let summary = Event::OrderExecuted {
        request_id,
        order_id,
        trades: fills
            .iter()
            .map(|&(price, quantity, counter_order_id)| TradeSummary { price, quantity, counter_order_id })
            .collect(),
    };
    let trades = fills.iter().map(|&(price, quantity, counter_order_id)| {
        let (buy_order_id, sell_order_id) = match side {
            Side::Buy => (order_id, counter_order_id),
            Side::Sell => (counter_order_id, order_id),
        };
        Event::Trade {
            isin: ISIN.to_string(),
            time: 0,
            price,
            quantity,
            buy_order_id,
            sell_order_id,
        }
    });
    std::iter::once(summary).chain(trades).collect()
}

fn seeded() -> Exchange {
    let exchange = Exchange::new(EngineConfig::default());
    let ledger = exchange.ledger();
    ledger.add_broker(Broker::new(RICH, RICH_CREDIT));
    ledger.add_broker(Broker::new(POOR, POOR_CREDIT));
    let mut holder = Shareholder::new(RICH);
    holder.increase_position(ISIN, RICH_POSITION);
    ledger.add_shareholder(holder);
    ledger.add_shareholder(Shareholder::new(POOR));
    exchange.add_security(ISIN, Some(15_000)).unwrap();

    let book = [
        (6, Side::Sell, 350, 15_800),
        (7, Side::Sell, 285, 15_810),
        (8, Side::Sell, 800, 15_810),
        (9, Side::Sell, 340, 15_820),
        (10, Side::Sell, 65, 15_820),
        (1, Side::Buy, 304, 15_700),
        (2, Side::Buy, 43, 15_500),
        (3, Side::Buy, 445, 15_450),
        (4, Side::Buy, 526, 15_450),
        (5, Side::Buy, 1_000, 15_400),
    ];
    for (id, side, quantity, price) in book {
        assert_eq!(exchange.handle_enter_order(&new_order(id, side, quantity, price)), vec![accepted(id)]);
    }
    exchange
}

fn buy_ids(exchange: &Exchange) -> Vec<u64> {
    exchange.security(ISIN).unwrap().lock().order_book().order_ids(Side::Buy)
}

fn sell_ids(exchange: &Exchange) -> Vec<u64> {
    exchange.security(ISIN).unwrap().lock().order_book().order_ids(Side::Sell)
}

fn inactive_ids(exchange: &Exchange, side: Side) -> Vec<u64> {
    exchange.security(ISIN).unwrap().lock().inactive_book().order_ids(side)
}

fn market_price(exchange: &Exchange) -> Option<u64> {
    exchange.security(ISIN).unwrap().lock().market_price()
}

fn credit(exchange: &Exchange, broker: u64) -> u64 {
    exchange.ledger().credit(broker).unwrap()
}

fn position(exchange: &Exchange, shareholder: u64) -> u64 {
    exchange.ledger().position(shareholder, ISIN).unwrap()
}

/// Credit left to the rich broker after seeding the five buys
const SEEDED_CREDIT: u64 =
    RICH_CREDIT - (15_700 * 304 + 15_500 * 43 + 15_450 * 445 + 15_450 * 526 + 15_400 * 1_000);

/// Position left to the rich shareholder after seeding the five sells
const SEEDED_POSITION: u64 = RICH_POSITION - (350 + 285 + 800 + 340 + 65);

// ============================================================================
// Seeded book
// ============================================================================

#[test]
fn seeded_book_is_in_priority_order() {
    let exchange = seeded();

    assert_eq!(buy_ids(&exchange), vec![1, 2, 3, 4, 5]);
    assert_eq!(sell_ids(&exchange), vec![6, 7, 8, 9, 10]);
    assert_eq!(market_price(&exchange), Some(15_000));
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT);
    assert_eq!(position(&exchange, RICH), SEEDED_POSITION);
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn buy_trades_at_resting_price_and_settles() {
    let exchange = seeded();

    let rq = EnterOrderRq::new_order(11, ISIN, 11, Side::Buy, 10, 15_900, RICH, POOR);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(events, [vec![accepted(11)], executed(11, 11, Side::Buy, &[(15_800, 10, 6)])].concat());
    assert_eq!(market_price(&exchange), Some(15_800));
    assert_eq!(sell_ids(&exchange), vec![6, 7, 8, 9, 10]);

    // Reserved 159_000, paid 158_000 to itself as the seller's broker: net
    // unchanged. The buying shareholder receives the shares.
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT);
    assert_eq!(position(&exchange, POOR), 10);
    assert_eq!(position(&exchange, RICH), SEEDED_POSITION);
}

#[test]
fn sell_sweeps_levels_and_rests_remainder() {
    let exchange = seeded();

    let events = exchange.handle_enter_order(&new_order(11, Side::Sell, 400, 15_500));

    assert_eq!(
        events,
        [vec![accepted(11)], executed(11, 11, Side::Sell, &[(15_700, 304, 1), (15_500, 43, 2)])].concat()
    );
    assert_eq!(buy_ids(&exchange), vec![3, 4, 5]);
    assert_eq!(sell_ids(&exchange), vec![11, 6, 7, 8, 9, 10]);
    let security = exchange.security(ISIN).unwrap();
    let security = security.lock();
    assert_eq!(security.order_book().get(11).unwrap().quantity, 53);
    assert_eq!(security.market_price(), Some(15_500));
}

#[test]
fn incoming_iceberg_matches_its_total_then_rests_a_peak() {
    let exchange = seeded();

    let rq = new_order(11, Side::Sell, 500, 15_700).with_peak_size(100);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(events, [vec![accepted(11)], executed(11, 11, Side::Sell, &[(15_700, 304, 1)])].concat());
    let security = exchange.security(ISIN).unwrap();
    let security = security.lock();
    let iceberg = security.order_book().get(11).unwrap();
    assert_eq!(iceberg.quantity, 100);
    assert_eq!(iceberg.hidden_quantity(), 96);
    assert_eq!(security.order_book().best_ask(), Some(15_700));
}

#[test]
fn resting_iceberg_loses_priority_when_replenished() {
    let exchange = seeded();
    exchange.handle_enter_order(&new_order(11, Side::Sell, 300, 15_800).with_peak_size(100));
    assert_eq!(sell_ids(&exchange), vec![6, 11, 7, 8, 9, 10]);

    // Takes all of 6, then the iceberg's first peak, then 50 more at 15_810
    let events = exchange.handle_enter_order(&new_order(12, Side::Buy, 500, 15_810));

    assert_eq!(
        events,
        [
            vec![accepted(12)],
            executed(12, 12, Side::Buy, &[(15_800, 350, 6), (15_800, 100, 11), (15_800, 50, 11)]),
        ]
        .concat()
    );
    // Requeued alone at its level, so the refilled peak is hit again
    let security = exchange.security(ISIN).unwrap();
    let security = security.lock();
    let iceberg = security.order_book().get(11).unwrap();
    assert_eq!(iceberg.quantity, 50);
    assert_eq!(iceberg.hidden_quantity(), 100);
}

#[test]
fn every_fill_is_reported_once_as_a_trade() {
    let exchange = seeded();

    let rq = new_order(11, Side::Sell, 400, 15_500).with_entry_time(7);
    let events = exchange.handle_enter_order(&rq);

    let trades: Vec<&Event> = events.iter().filter(|e| matches!(e, Event::Trade { .. })).collect();
    assert_eq!(
        trades,
        vec![
            &Event::Trade {
                isin: ISIN.to_string(),
                time: 7,
                price: 15_700,
                quantity: 304,
                buy_order_id: 1,
                sell_order_id: 11,
            },
            &Event::Trade {
                isin: ISIN.to_string(),
                time: 7,
                price: 15_500,
                quantity: 43,
                buy_order_id: 2,
                sell_order_id: 11,
            },
        ]
    );
}

// ============================================================================
// Minimum execution quantity
// ============================================================================

#[test]
fn meq_not_met_rejects_without_trading() {
    let exchange = seeded();
    exchange.handle_enter_order(&new_order(11, Side::Sell, 7, 15_750));
    let before = exchange.security(ISIN).unwrap().lock().state_root().unwrap();
    let credit_before = credit(&exchange, RICH);

    // Only the 7 at 15_750 crosses a limit of 15_790
    let rq = new_order(12, Side::Buy, 20, 15_790).with_min_execution_quantity(10);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(
        events[0].errors(),
        &[RejectReason::InsufficientExecutionQuantity { required: 10, executable: 7 }]
    );
    let security = exchange.security(ISIN).unwrap();
    let security = security.lock();
    assert_eq!(security.trade_count(), 0);
    assert_eq!(security.state_root().unwrap(), before);
    assert_eq!(credit(&exchange, RICH), credit_before);
}

#[test]
fn meq_met_executes_normally() {
    let exchange = seeded();
    exchange.handle_enter_order(&new_order(11, Side::Sell, 7, 15_750));

    let rq = new_order(12, Side::Buy, 20, 15_790).with_min_execution_quantity(7);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(events, [vec![accepted(12)], executed(12, 12, Side::Buy, &[(15_750, 7, 11)])].concat());
    assert_eq!(buy_ids(&exchange), vec![12, 1, 2, 3, 4, 5]);
}

// ============================================================================
// Credit and position
// ============================================================================

#[test]
fn insufficient_credit_rejects_and_leaves_book_unchanged() {
    let exchange = seeded();
    let before = exchange.security(ISIN).unwrap().lock().order_book().order_count();

    let rq = EnterOrderRq::new_order(11, ISIN, 11, Side::Buy, 10, 15_800, POOR, RICH);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(
        events,
        vec![Event::OrderRejected {
            request_id: 11,
            order_id: 11,
            errors: vec![RejectReason::InsufficientCredit { required: 158_000, available: POOR_CREDIT }],
        }]
    );
    assert_eq!(exchange.security(ISIN).unwrap().lock().order_book().order_count(), before);
    assert_eq!(credit(&exchange, POOR), POOR_CREDIT);
}

#[test]
fn insufficient_position_rejects() {
    let exchange = seeded();

    let rq = EnterOrderRq::new_order(11, ISIN, 11, Side::Sell, 10, 15_000, RICH, POOR);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(
        events[0].errors(),
        &[RejectReason::InsufficientPosition { required: 10, available: 0 }]
    );
    assert_eq!(buy_ids(&exchange), vec![1, 2, 3, 4, 5]);
}

#[test]
fn validation_failures_are_reported_together() {
    let exchange = seeded();

    let rq = new_order(1, Side::Buy, -3, 0).with_stop_price(-1);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(
        events[0].errors(),
        &[
            RejectReason::Validation(ValidationError::NonPositiveQuantity),
            RejectReason::Validation(ValidationError::NonPositivePrice),
            RejectReason::Validation(ValidationError::StopPriceNotPositive),
            RejectReason::DuplicateOrderId(1),
        ]
    );
}

#[test]
fn admit_then_delete_restores_ledger_and_book() {
    let exchange = seeded();
    let root = exchange.security(ISIN).unwrap().lock().state_root().unwrap();

    exchange.handle_enter_order(&new_order(11, Side::Buy, 100, 15_600).with_peak_size(10));
    exchange.handle_enter_order(&new_order(12, Side::Sell, 40, 15_900));
    exchange.handle_enter_order(&new_order(13, Side::Buy, 5, 15_000).with_stop_price(17_000));
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT - 1_560_000 - 75_000);
    assert_eq!(position(&exchange, RICH), SEEDED_POSITION - 40);

    for (request_id, side, order_id) in [(14, Side::Buy, 11), (15, Side::Sell, 12), (16, Side::Buy, 13)] {
        let events = exchange.handle_delete_order(&DeleteOrderRq::new(request_id, ISIN, side, order_id));
        assert_eq!(events, vec![Event::OrderDeleted { request_id, order_id }]);
    }

    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT);
    assert_eq!(position(&exchange, RICH), SEEDED_POSITION);
    assert_eq!(exchange.security(ISIN).unwrap().lock().state_root().unwrap(), root);
}

#[test]
fn delete_unknown_order() {
    let exchange = seeded();

    let events = exchange.handle_delete_order(&DeleteOrderRq::new(11, ISIN, Side::Sell, 99));

    assert_eq!(events[0].errors(), &[RejectReason::OrderNotFound(99)]);
}

// ============================================================================
// Stop-limit orders
// ============================================================================

#[test]
fn stop_buy_above_market_waits_inactive() {
    let exchange = seeded();

    // Market 15_000 has not reached the 16_000 trigger. The limit would
    // cross the book, but the order must not match.
    let rq = new_order(11, Side::Buy, 10, 15_900).with_stop_price(16_000);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(events, vec![accepted(11)]);
    assert_eq!(inactive_ids(&exchange, Side::Buy), vec![11]);
    assert_eq!(sell_ids(&exchange), vec![6, 7, 8, 9, 10]);
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT - 159_000);
}

#[test]
fn stop_buy_below_market_activates_and_matches_instantly() {
    let exchange = seeded();

    let rq = new_order(11, Side::Buy, 10, 15_800).with_stop_price(14_000);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(
        events,
        [vec![activated(11), accepted(11)], executed(11, 11, Side::Buy, &[(15_800, 10, 6)])].concat()
    );
    assert!(inactive_ids(&exchange, Side::Buy).is_empty());
    assert_eq!(market_price(&exchange), Some(15_800));
}

#[test]
fn stop_sell_above_market_activates_instantly() {
    let exchange = seeded();

    let rq = new_order(11, Side::Sell, 10, 15_700).with_stop_price(16_000);
    let events = exchange.handle_enter_order(&rq);

    assert_eq!(
        events,
        [vec![activated(11), accepted(11)], executed(11, 11, Side::Sell, &[(15_700, 10, 1)])].concat()
    );
    assert!(inactive_ids(&exchange, Side::Sell).is_empty());
}

#[test]
fn trade_activates_stop_which_rests_behind_its_level() {
    let exchange = seeded();
    exchange.handle_enter_order(&new_order(11, Side::Buy, 10, 15_700).with_stop_price(15_800));

    let events = exchange.handle_enter_order(&new_order(12, Side::Buy, 10, 15_800));

    assert_eq!(
        events,
        [
            vec![accepted(12)],
            executed(12, 12, Side::Buy, &[(15_800, 10, 6)]),
            vec![activated(11)],
        ]
        .concat()
    );
    // 15_700 does not cross 15_800: the activated order rests behind order 1
    assert_eq!(buy_ids(&exchange), vec![1, 11, 2, 3, 4, 5]);
    assert!(inactive_ids(&exchange, Side::Buy).is_empty());
}

#[test]
fn equal_stops_activate_in_admission_order() {
    let exchange = seeded();
    for id in [11, 12, 13] {
        let events = exchange.handle_enter_order(&new_order(id, Side::Buy, 10, 15_900).with_stop_price(15_800));
        assert_eq!(events, vec![accepted(id)]);
    }
    assert_eq!(inactive_ids(&exchange, Side::Buy), vec![11, 12, 13]);

    let events = exchange.handle_enter_order(&new_order(14, Side::Buy, 10, 15_800));

    assert_eq!(
        events,
        [
            vec![accepted(14)],
            executed(14, 14, Side::Buy, &[(15_800, 10, 6)]),
            vec![activated(11)],
            executed(11, 11, Side::Buy, &[(15_800, 10, 6)]),
            vec![activated(12)],
            executed(12, 12, Side::Buy, &[(15_800, 10, 6)]),
            vec![activated(13)],
            executed(13, 13, Side::Buy, &[(15_800, 10, 6)]),
        ]
        .concat()
    );
    let security = exchange.security(ISIN).unwrap();
    assert_eq!(security.lock().order_book().get(6).unwrap().quantity, 310);
}

#[test]
fn cascade_chains_through_price_moves() {
    let exchange = seeded();
    // Activated by the trade at 15_800; lifts 15_810
    exchange.handle_enter_order(&new_order(11, Side::Buy, 400, 15_810).with_stop_price(15_800));
    // Activated by the trade at 15_810; lifts 15_820
    exchange.handle_enter_order(&new_order(12, Side::Buy, 700, 15_820).with_stop_price(15_810));

    let events = exchange.handle_enter_order(&new_order(13, Side::Buy, 350, 15_800));

    assert_eq!(
        events,
        [
            vec![accepted(13)],
            executed(13, 13, Side::Buy, &[(15_800, 350, 6)]),
            vec![activated(11)],
            executed(11, 11, Side::Buy, &[(15_810, 285, 7), (15_810, 115, 8)]),
            vec![activated(12)],
            executed(12, 12, Side::Buy, &[(15_810, 685, 8), (15_820, 15, 9)]),
        ]
        .concat()
    );
    assert_eq!(market_price(&exchange), Some(15_820));
    assert_eq!(sell_ids(&exchange), vec![9, 10]);
}

#[test]
fn sell_stop_activates_when_market_falls_to_it() {
    let exchange = seeded();
    exchange.handle_enter_order(&new_order(11, Side::Sell, 50, 15_400).with_stop_price(14_500));
    assert_eq!(inactive_ids(&exchange, Side::Sell), vec![11]);

    // A sell that takes the whole bid side down to 15_400 leaves the market
    // at 15_400, still above the 14_500 trigger
    exchange.handle_enter_order(&new_order(12, Side::Sell, 2_318, 15_400));
    assert_eq!(market_price(&exchange), Some(15_400));
    assert_eq!(inactive_ids(&exchange, Side::Sell), vec![11]);

    // Trade at 14_500 triggers it; it rests as the best ask
    exchange.handle_enter_order(&new_order(13, Side::Buy, 5, 14_500));
    let events = exchange.handle_enter_order(&new_order(14, Side::Sell, 5, 14_500));

    assert_eq!(
        events,
        [vec![accepted(14)], executed(14, 14, Side::Sell, &[(14_500, 5, 13)]), vec![activated(11)]].concat()
    );
    assert_eq!(sell_ids(&exchange)[0], 11);
}

#[test]
fn cascade_scan_is_idempotent_once_drained() {
    let exchange = seeded();
    for id in [11, 12] {
        exchange.handle_enter_order(&new_order(id, Side::Buy, 10, 15_900).with_stop_price(15_800));
    }
    exchange.handle_enter_order(&new_order(13, Side::Buy, 10, 15_800));

    let security = exchange.security(ISIN).unwrap();
    let mut security = security.lock();
    let root = security.state_root().unwrap();
    for _ in 0..3 {
        assert!(security.activate_stop_orders(0, exchange.ledger()).is_empty());
        assert_eq!(security.state_root().unwrap(), root);
    }
}

#[test]
fn delete_inactive_stop_releases_credit() {
    let exchange = seeded();
    exchange.handle_enter_order(&new_order(11, Side::Buy, 10, 15_900).with_stop_price(16_000));

    let events = exchange.handle_delete_order(&DeleteOrderRq::new(12, ISIN, Side::Buy, 11));

    assert_eq!(events, vec![Event::OrderDeleted { request_id: 12, order_id: 11 }]);
    assert!(inactive_ids(&exchange, Side::Buy).is_empty());
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT);
}

// ============================================================================
// Updates
// ============================================================================

#[test]
fn quantity_decrease_keeps_priority() {
    let exchange = seeded();

    let events = exchange.handle_enter_order(&update(11, 3, Side::Buy, 100, 15_450));

    assert_eq!(events, vec![Event::OrderUpdated { request_id: 11, order_id: 3 }]);
    assert_eq!(buy_ids(&exchange), vec![1, 2, 3, 4, 5]);
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT + 15_450 * 345);
}

#[test]
fn quantity_increase_loses_priority() {
    let exchange = seeded();

    let events = exchange.handle_enter_order(&update(11, 3, Side::Buy, 500, 15_450));

    assert_eq!(events, vec![Event::OrderUpdated { request_id: 11, order_id: 3 }]);
    assert_eq!(buy_ids(&exchange), vec![1, 2, 4, 3, 5]);
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT - 15_450 * 55);
}

#[test]
fn price_change_loses_priority() {
    let exchange = seeded();

    // Same quantity, new price level and back again: behind order 4 now
    exchange.handle_enter_order(&update(11, 3, Side::Buy, 445, 15_460));
    assert_eq!(buy_ids(&exchange), vec![1, 2, 3, 4, 5]);
    exchange.handle_enter_order(&update(12, 3, Side::Buy, 445, 15_450));
    assert_eq!(buy_ids(&exchange), vec![1, 2, 4, 3, 5]);
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT);
}

#[test]
fn price_update_that_crosses_trades() {
    let exchange = seeded();

    let events = exchange.handle_enter_order(&update(11, 1, Side::Buy, 304, 15_800));

    assert_eq!(
        events,
        [
            vec![Event::OrderUpdated { request_id: 11, order_id: 1 }],
            executed(11, 1, Side::Buy, &[(15_800, 304, 6)]),
        ]
        .concat()
    );
    assert_eq!(buy_ids(&exchange), vec![2, 3, 4, 5]);
    assert_eq!(market_price(&exchange), Some(15_800));
}

#[test]
fn update_rejections_leave_order_untouched() {
    let exchange = seeded();
    let root = exchange.security(ISIN).unwrap().lock().state_root().unwrap();

    let owner = EnterOrderRq::update_order(11, ISIN, 5, Side::Buy, 10, 15_400, POOR, RICH);
    assert_eq!(exchange.handle_enter_order(&owner)[0].errors(), &[RejectReason::Validation(ValidationError::OwnerChanged)]);

    let meq = update(12, 5, Side::Buy, 1_000, 15_400).with_min_execution_quantity(5);
    assert_eq!(
        exchange.handle_enter_order(&meq)[0].errors(),
        &[RejectReason::Validation(ValidationError::MinimumExecutionQuantityChanged)]
    );

    let stop = update(13, 5, Side::Buy, 1_000, 15_400).with_stop_price(16_000);
    assert_eq!(
        exchange.handle_enter_order(&stop)[0].errors(),
        &[RejectReason::Validation(ValidationError::StopPriceOnActiveOrder)]
    );

    let missing = update(14, 99, Side::Buy, 1_000, 15_400);
    assert_eq!(exchange.handle_enter_order(&missing)[0].errors(), &[RejectReason::OrderNotFound(99)]);

    // Needs 1_540_000_000 of credit; the old reservation counts towards it
    let huge = update(15, 5, Side::Buy, 100_000, 15_400);
    assert_eq!(
        exchange.handle_enter_order(&huge)[0].errors(),
        &[RejectReason::InsufficientCredit {
            required: 1_540_000_000,
            available: SEEDED_CREDIT + 15_400_000,
        }]
    );

    assert_eq!(exchange.security(ISIN).unwrap().lock().state_root().unwrap(), root);
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT);
}

#[test]
fn inactive_stop_must_keep_a_stop_price() {
    let exchange = seeded();
    exchange.handle_enter_order(&new_order(11, Side::Buy, 10, 15_700).with_stop_price(16_000));

    let events = exchange.handle_enter_order(&update(12, 11, Side::Buy, 10, 15_700));

    assert_eq!(events[0].errors(), &[RejectReason::Validation(ValidationError::StopPriceNotPositive)]);
    assert_eq!(inactive_ids(&exchange, Side::Buy), vec![11]);
}

#[test]
fn stop_update_that_is_satisfied_activates_immediately() {
    let exchange = seeded();
    exchange.handle_enter_order(&new_order(11, Side::Buy, 10, 15_700).with_stop_price(16_000));

    let events = exchange.handle_enter_order(&update(12, 11, Side::Buy, 10, 15_700).with_stop_price(14_000));

    assert_eq!(
        events,
        vec![activated(11), Event::OrderUpdated { request_id: 12, order_id: 11 }]
    );
    assert!(inactive_ids(&exchange, Side::Buy).is_empty());
    assert_eq!(buy_ids(&exchange), vec![1, 11, 2, 3, 4, 5]);
}

#[test]
fn side_change_swaps_reservation_kind() {
    let exchange = seeded();

    let events = exchange.handle_enter_order(&update(11, 5, Side::Sell, 100, 16_000));

    assert_eq!(events, vec![Event::OrderUpdated { request_id: 11, order_id: 5 }]);
    assert_eq!(buy_ids(&exchange), vec![1, 2, 3, 4]);
    assert_eq!(sell_ids(&exchange), vec![6, 7, 8, 9, 10, 5]);
    assert_eq!(credit(&exchange, RICH), SEEDED_CREDIT + 15_400_000);
    assert_eq!(position(&exchange, RICH), SEEDED_POSITION - 100);
}

#[test]
fn in_place_update_does_not_refill_a_consumed_peak() {
    let exchange = seeded();
    exchange.handle_enter_order(&new_order(11, Side::Sell, 300, 15_790).with_peak_size(100));
    exchange.handle_enter_order(&new_order(12, Side::Sell, 50, 15_790));
    exchange.handle_enter_order(&new_order(13, Side::Buy, 70, 15_790));

    let events = exchange.handle_enter_order(&update(14, 11, Side::Sell, 230, 15_790).with_peak_size(100));

    assert_eq!(events, vec![Event::OrderUpdated { request_id: 14, order_id: 11 }]);
    {
        let security = exchange.security(ISIN).unwrap();
        let security = security.lock();
        let iceberg = security.order_book().get(11).unwrap();
        assert_eq!(iceberg.quantity, 30);
        assert_eq!(iceberg.hidden_quantity(), 200);
        assert_eq!(security.order_book().depth_at(Side::Sell, 15_790), 80);
    }
    assert_eq!(sell_ids(&exchange), vec![11, 12, 6, 7, 8, 9, 10]);

    // Only the 30 left in the peak trade ahead of order 12; the refill goes
    // behind it
    let events = exchange.handle_enter_order(&new_order(15, Side::Buy, 40, 15_790));

    assert_eq!(
        events,
        [vec![accepted(15)], executed(15, 15, Side::Buy, &[(15_790, 30, 11), (15_790, 10, 12)])].concat()
    );
    assert_eq!(sell_ids(&exchange), vec![12, 11, 6, 7, 8, 9, 10]);
}
