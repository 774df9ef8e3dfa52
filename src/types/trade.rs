//! Trade type representing an executed match between two orders.

use crate::types::{Order, Side};

/// A trade is a single match between a buy order and a sell order.
///
/// ## Price Discovery
///
/// The trade always executes at the resting order's price. The broker and
/// shareholder ids of both parties are carried so settlement never needs
/// to look the orders up again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trade {
    /// Per-security trade sequence number
    pub id: u64,

    /// Execution price in ticks
    pub price: u64,

    /// Executed quantity
    pub quantity: u64,

    /// Buy order id
    pub buy_order_id: u64,

    /// Sell order id
    pub sell_order_id: u64,

    /// Broker paying for the shares
    pub buy_broker_id: u64,

    /// Broker receiving the notional
    pub sell_broker_id: u64,

    /// Shareholder receiving the shares
    pub buy_shareholder_id: u64,

    /// Shareholder delivering the shares
    pub sell_shareholder_id: u64,

    /// Execution time (ms), taken from the request
    pub time: u64,
}

impl Trade {
    /// Create a trade between an incoming order and a resting order.
    ///
    /// The price is the resting order's price.
    pub fn new(id: u64, incoming: &Order, resting: &Order, quantity: u64, time: u64) -> Self {
        let (buy, sell) = match incoming.side {
            Side::Buy => (incoming, resting),
            Side::Sell => (resting, incoming),
        };
        Self {
            id,
            price: resting.price,
            quantity,
            buy_order_id: buy.id,
            sell_order_id: sell.id,
            buy_broker_id: buy.broker_id,
            sell_broker_id: sell.broker_id,
            buy_shareholder_id: buy.shareholder_id,
            sell_shareholder_id: sell.shareholder_id,
            time,
        }
    }

    /// Notional value of this trade (price * quantity)
    pub fn notional(&self) -> u128 {
        (self.price as u128) * (self.quantity as u128)
    }

    /// The order id on the other side of `order_id`
    pub fn counter_order_id(&self, order_id: u64) -> u64 {
        if self.buy_order_id == order_id {
            self.sell_order_id
        } else {
            self.buy_order_id
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
