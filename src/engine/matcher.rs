//! Price-time priority matcher.
//!
//! The matcher walks the opposite side of an [`OrderBook`] best first and
//! trades while the incoming order crosses. It owns only the per-security
//! trade id counter; settlement and resting are up to the caller.

use tracing::trace;

use crate::error::RejectReason;
use crate::orderbook::{crosses, Fill, OrderBook};
use crate::types::{Order, Trade};

/// Result of matching one incoming order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// Trades in execution order
    pub trades: Vec<Trade>,

    /// Total quantity executed
    pub filled_quantity: u64,

    /// Whether the incoming order has nothing left
    pub fully_filled: bool,
}

impl MatchResult {
    /// Price of the last trade, the new market price
    pub fn last_price(&self) -> Option<u64> {
        self.trades.last().map(|trade| trade.price)
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Continuous matcher for one security.
#[derive(Debug, Clone)]
pub struct Matcher {
    next_trade_id: u64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    pub fn new() -> Self {
        Self { next_trade_id: 1 }
    }

    /// Number of trades executed so far
    pub fn trade_count(&self) -> u64 {
        self.next_trade_id - 1
    }

    /// Check an incoming order's minimum execution quantity against the book
    /// without touching it.
    pub fn check_min_execution(book: &OrderBook, order: &Order) -> Result<(), RejectReason> {
        let required = order.min_execution_quantity;
        if required == 0 {
            return Ok(());
        }
        let executable = book.executable_quantity(order);
        if executable < required {
            return Err(RejectReason::InsufficientExecutionQuantity {
                required,
                executable,
            });
        }
        Ok(())
    }

    /// Match `order` against the opposite side of `book`.
    ///
    /// The order trades against its total (visible plus hidden) quantity.
    /// On return its remaining quantity is redistributed by its peak size,
    /// ready to rest.
    pub fn match_order(&mut self, book: &mut OrderBook, order: &mut Order, time: u64) -> MatchResult {
        let mut remaining = order.total_quantity();
        let mut trades = Vec::new();

        while remaining > 0 {
            let Some(resting) = book.peek_best(order.side) else {
                break;
            };
            if !crosses(order, resting.price) {
                break;
            }

            let quantity = remaining.min(resting.quantity);
            let trade = Trade::new(self.next_trade_id, order, resting, quantity, time);
            self.next_trade_id += 1;

            trace!(
                trade_id = trade.id,
                price = trade.price,
                quantity,
                resting = resting.id,
                "trade"
            );

            if let Fill::Removed(filled) = book.fill_best(order.side.opposite(), quantity) {
                trace!(order_id = filled.id, "resting order filled");
            }
            remaining -= quantity;
            trades.push(trade);
        }

        let filled_quantity = order.total_quantity() - remaining;
        order.set_total_quantity(remaining);

        MatchResult {
            trades,
            filled_quantity,
            fully_filled: remaining == 0,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
