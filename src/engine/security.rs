//! Per-instrument orchestration.
//!
//! A [`Security`] owns the active and inactive books of one instrument and
//! drives every request through the same pipeline:
//!
//! ```text
//! validate -> reserve -> stop gate -> match -> settle -> rest
//!          -> market price -> activation cascade -> events
//! ```
//!
//! Validation and reservation failures leave the security and the ledger
//! untouched. Once a reservation is held every later step is infallible;
//! a failure there is a bug and panics.
//!
//! ## Activation cascade
//!
//! Each trade moves the market price, which may satisfy the condition of
//! waiting stop-limit orders. After every request the security repeatedly
//! takes the highest-priority triggered stop order out of the inactive book,
//! activates it and runs it through match/settle/rest. Each round can only
//! shrink the inactive book, so the loop terminates.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::engine::matcher::Matcher;
use crate::engine::validation::{order_from_request, validate_enter_order};
use crate::error::{DigestError, RejectReason, ValidationError};
use crate::ledger::{Ledger, Reservation};
use crate::orderbook::{state_root, InactiveOrderBook, OrderBook, StateRoot};
use crate::types::{DeleteOrderRq, EnterOrderRq, Event, Order, OrderId, RequestType, Side, Trade};

/// One tradable instrument.
#[derive(Debug)]
pub struct Security {
    isin: String,
    order_book: OrderBook,
    inactive_book: InactiveOrderBook,
    market_price: Option<u64>,
    matcher: Matcher,
    /// Request that admitted each waiting stop order, reported again when it
    /// executes after activation
    stop_requests: HashMap<OrderId, u64>,
}

impl Security {
    pub fn new(isin: impl Into<String>) -> Self {
        Self::with_capacity(isin, 0, 0)
    }

    /// Create a security with pre-allocated book storage
    pub fn with_capacity(isin: impl Into<String>, order_capacity: usize, stop_order_capacity: usize) -> Self {
        Self {
            isin: isin.into(),
            order_book: OrderBook::with_capacity(order_capacity),
            inactive_book: InactiveOrderBook::with_capacity(stop_order_capacity),
            market_price: None,
            matcher: Matcher::new(),
            stop_requests: HashMap::new(),
        }
    }

    /// Set the reference market price stop orders are gated against
    pub fn with_market_price(mut self, market_price: u64) -> Self {
        self.market_price = Some(market_price);
        self
    }

    pub fn isin(&self) -> &str {
        &self.isin
    }

    pub fn order_book(&self) -> &OrderBook {
        &self.order_book
    }

    pub fn inactive_book(&self) -> &InactiveOrderBook {
        &self.inactive_book
    }

    /// Last traded price, or the configured reference price before any trade
    pub fn market_price(&self) -> Option<u64> {
        self.market_price
    }

    /// Number of trades executed in this security
    pub fn trade_count(&self) -> u64 {
        self.matcher.trade_count()
    }

    /// Order with `order_id` in either book
    pub fn find_order(&self, order_id: OrderId) -> Option<&Order> {
        self.order_book
            .get(order_id)
            .or_else(|| self.inactive_book.get(order_id))
    }

    pub fn state_root(&self) -> Result<StateRoot, DigestError> {
        state_root(&self.order_book, &self.inactive_book, self.market_price)
    }

    // ========================================================================
    // Request entry points
    // ========================================================================

    /// Handle a new-order or update-order request.
    pub fn enter_order(&mut self, rq: &EnterOrderRq, ledger: &Ledger) -> Vec<Event> {
        match rq.request_type {
            RequestType::NewOrder => self.new_order(rq, ledger),
            RequestType::UpdateOrder => self.update_order(rq, ledger),
        }
    }

    /// Handle a delete-order request.
    pub fn delete_order(&mut self, rq: &DeleteOrderRq, ledger: &Ledger) -> Vec<Event> {
        let in_active = self
            .order_book
            .get(rq.order_id)
            .is_some_and(|order| order.side == rq.side);
        let in_inactive = self
            .inactive_book
            .get(rq.order_id)
            .is_some_and(|order| order.side == rq.side);

        let removed = if in_active {
            self.order_book.remove(rq.order_id)
        } else if in_inactive {
            self.inactive_book.remove(rq.order_id)
        } else {
            debug!(isin = %self.isin, order_id = rq.order_id, "delete of unknown order");
            return vec![Event::rejected(
                rq.request_id,
                rq.order_id,
                vec![RejectReason::OrderNotFound(rq.order_id)],
            )];
        };
        let order = removed.expect("order located before removal");

        self.stop_requests.remove(&order.id);
        let reservation = self.reservation(&order);
        ledger
            .release(&reservation)
            .expect("reservation of a resting order is releasable");

        info!(isin = %self.isin, order_id = order.id, "order deleted");
        vec![Event::OrderDeleted {
            request_id: rq.request_id,
            order_id: rq.order_id,
        }]
    }

    /// Run the activation scan on its own. Requests already run it to
    /// completion, so outside of tests this returns no events.
    pub fn activate_stop_orders(&mut self, time: u64, ledger: &Ledger) -> Vec<Event> {
        let mut events = Vec::new();
        self.run_cascade(time, ledger, &mut events);
        events
    }

    // ========================================================================
    // New order
    // ========================================================================

    fn new_order(&mut self, rq: &EnterOrderRq, ledger: &Ledger) -> Vec<Event> {
        let mut errors = validate_enter_order(rq, ledger);
        if self.find_order(rq.order_id).is_some() {
            errors.push(RejectReason::DuplicateOrderId(rq.order_id));
        }
        if !errors.is_empty() {
            return self.reject(rq.request_id, rq.order_id, errors);
        }

        let order = order_from_request(rq);
        let reservation = self.reservation(&order);
        if let Err(err) = ledger.reserve(&reservation) {
            return self.reject(rq.request_id, rq.order_id, vec![err.into()]);
        }

        if let Err(reason) = Matcher::check_min_execution(&self.order_book, &order) {
            ledger
                .release(&reservation)
                .expect("reservation just taken is releasable");
            return self.reject(rq.request_id, rq.order_id, vec![reason]);
        }

        info!(isin = %self.isin, order_id = order.id, side = ?order.side, price = order.price, "order accepted");
        let accepted = Event::OrderAccepted {
            request_id: rq.request_id,
            order_id: order.id,
        };

        let mut events = Vec::new();
        self.admit(order, rq.request_id, accepted, rq.entry_time, ledger, &mut events);
        self.run_cascade(rq.entry_time, ledger, &mut events);
        events
    }

    /// Stop gate, then match/settle/rest for an order whose reservation is
    /// already held. `ack` is the request's own Accepted/Updated event; a stop
    /// order that activates on entry reports its activation ahead of it.
    fn admit(
        &mut self,
        mut order: Order,
        request_id: u64,
        ack: Event,
        time: u64,
        ledger: &Ledger,
        events: &mut Vec<Event>,
    ) {
        if order.is_inactive_stop() {
            if !order.stop_triggered(self.market_price) {
                debug!(
                    isin = %self.isin,
                    order_id = order.id,
                    stop_price = order.stop_price(),
                    "stop order parked"
                );
                self.stop_requests.insert(order.id, request_id);
                self.inactive_book
                    .insert(order)
                    .expect("order id checked against both books");
                events.push(ack);
                return;
            }
            order.activate();
            info!(isin = %self.isin, order_id = order.id, "stop order activated on entry");
            events.push(Event::OrderActivated { order_id: order.id });
        }
        events.push(ack);

        let order_id = order.id;
        let trades = self.execute(order, time, ledger);
        self.report_execution(request_id, order_id, &trades, events);
    }

    /// Match, settle, rest the remainder and move the market price.
    fn execute(&mut self, mut order: Order, time: u64, ledger: &Ledger) -> Vec<Trade> {
        let result = self
            .matcher
            .match_order(&mut self.order_book, &mut order, time);

        for trade in &result.trades {
            let reserved_price = match order.side {
                Side::Buy => order.price,
                Side::Sell => trade.price,
            };
            ledger
                .settle(trade, reserved_price, &self.isin)
                .expect("settlement between validated accounts");
        }

        if let Some(price) = result.last_price() {
            self.market_price = Some(price);
            info!(
                isin = %self.isin,
                order_id = order.id,
                trades = result.trades.len(),
                filled = result.filled_quantity,
                market_price = price,
                "order executed"
            );
        }

        if !result.fully_filled {
            self.order_book
                .insert(order)
                .expect("order id checked against both books");
        }
        result.trades
    }

    /// Activate every stop order the current market price satisfies.
    fn run_cascade(&mut self, time: u64, ledger: &Ledger, events: &mut Vec<Event>) {
        while let Some(mut order) = self.inactive_book.pop_triggered(self.market_price) {
            order.activate();
            let order_id = order.id;
            let request_id = self.stop_requests.remove(&order_id).unwrap_or_default();

            info!(
                isin = %self.isin,
                order_id,
                market_price = self.market_price,
                "stop order activated"
            );
            events.push(Event::OrderActivated { order_id });

            let trades = self.execute(order, time, ledger);
            self.report_execution(request_id, order_id, &trades, events);
        }
        debug_assert!(!self.inactive_book.has_triggered(self.market_price));
    }

    // ========================================================================
    // Update
    // ========================================================================

    fn update_order(&mut self, rq: &EnterOrderRq, ledger: &Ledger) -> Vec<Event> {
        let mut errors = validate_enter_order(rq, ledger);

        let in_active = self.order_book.contains(rq.order_id);
        let existing = match self.find_order(rq.order_id) {
            Some(order) => order.clone(),
            None => {
                errors.push(RejectReason::OrderNotFound(rq.order_id));
                return self.reject(rq.request_id, rq.order_id, errors);
            }
        };

        let mut fail = |err: ValidationError| errors.push(err.into());
        if rq.broker_id != existing.broker_id || rq.shareholder_id != existing.shareholder_id {
            fail(ValidationError::OwnerChanged);
        }
        if rq.min_execution_quantity >= 0 && rq.min_execution_quantity as u64 != existing.min_execution_quantity {
            fail(ValidationError::MinimumExecutionQuantityChanged);
        }
        if in_active && rq.stop_price > 0 {
            fail(ValidationError::StopPriceOnActiveOrder);
        }
        if !in_active && rq.stop_price == 0 {
            fail(ValidationError::StopPriceNotPositive);
        }
        if !errors.is_empty() {
            return self.reject(rq.request_id, rq.order_id, errors);
        }

        let mut updated = order_from_request(rq);
        updated.entry_time = existing.entry_time;

        let old = self.reservation(&existing);
        let new = self.reservation(&updated);
        if let Err(err) = ledger.swap(&old, &new) {
            return self.reject(rq.request_id, rq.order_id, vec![err.into()]);
        }

        let updated_event = Event::OrderUpdated {
            request_id: rq.request_id,
            order_id: rq.order_id,
        };

        let keeps_priority = updated.side == existing.side
            && updated.price == existing.price
            && updated.peak_size() == existing.peak_size()
            && (in_active || updated.stop_price() == existing.stop_price())
            && updated.total_quantity() <= existing.total_quantity();

        if keeps_priority {
            let book_result = if in_active {
                self.order_book.reduce_total_quantity(rq.order_id, updated.total_quantity())
            } else {
                self.inactive_book.reduce_total_quantity(rq.order_id, updated.total_quantity())
            };
            book_result.expect("order located before update");
            info!(isin = %self.isin, order_id = rq.order_id, "order updated in place");
            return vec![updated_event];
        }

        let removed = if in_active {
            self.order_book.remove(rq.order_id)
        } else {
            self.inactive_book.remove(rq.order_id)
        };
        removed.expect("order located before update");
        self.stop_requests.remove(&rq.order_id);
        info!(isin = %self.isin, order_id = rq.order_id, "order re-entered, priority lost");

        let mut events = Vec::new();
        self.admit(updated, rq.request_id, updated_event, rq.entry_time, ledger, &mut events);
        self.run_cascade(rq.entry_time, ledger, &mut events);
        events
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// One `OrderExecuted` for the order, then one `Trade` per fill.
    fn report_execution(&self, request_id: u64, order_id: OrderId, trades: &[Trade], events: &mut Vec<Event>) {
        if trades.is_empty() {
            return;
        }
        events.push(Event::executed(request_id, order_id, trades));
        events.extend(trades.iter().map(|trade| Event::trade(&self.isin, trade)));
    }

    fn reservation(&self, order: &Order) -> Reservation {
        Reservation::for_order(order, &self.isin).expect("notional checked by validation")
    }

    fn reject(&self, request_id: u64, order_id: OrderId, errors: Vec<RejectReason>) -> Vec<Event> {
        warn!(isin = %self.isin, order_id, ?errors, "order rejected");
        vec![Event::rejected(request_id, order_id, errors)]
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
