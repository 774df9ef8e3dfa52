//! Outbound events, returned synchronously to the caller of each request.
//!
//! The core never publishes; the caller hands these to its transport.

use serde::Serialize;

use crate::error::RejectReason;
use crate::types::{OrderId, Trade};

/// Trade as seen from one of its orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeSummary {
    pub price: u64,
    pub quantity: u64,
    pub counter_order_id: OrderId,
}

impl TradeSummary {
    pub fn for_order(trade: &Trade, order_id: OrderId) -> Self {
        Self {
            price: trade.price,
            quantity: trade.quantity,
            counter_order_id: trade.counter_order_id(order_id),
        }
    }
}

/// An outcome of processing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    OrderAccepted {
        request_id: u64,
        order_id: OrderId,
    },
    OrderRejected {
        request_id: u64,
        order_id: OrderId,
        errors: Vec<RejectReason>,
    },
    OrderExecuted {
        request_id: u64,
        order_id: OrderId,
        trades: Vec<TradeSummary>,
    },
    /// A stop-limit order left the inactive book. Emitted before its own
    /// execution event.
    OrderActivated {
        order_id: OrderId,
    },
    OrderUpdated {
        request_id: u64,
        order_id: OrderId,
    },
    OrderDeleted {
        request_id: u64,
        order_id: OrderId,
    },
    /// One fill, reported once for both parties. Follows the incoming
    /// order's `OrderExecuted`.
    Trade {
        isin: String,
        time: u64,
        price: u64,
        quantity: u64,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
    },
}

impl Event {
    pub(crate) fn rejected(request_id: u64, order_id: OrderId, errors: Vec<RejectReason>) -> Self {
        Event::OrderRejected {
            request_id,
            order_id,
            errors,
        }
    }

    pub(crate) fn executed(request_id: u64, order_id: OrderId, trades: &[Trade]) -> Self {
        Event::OrderExecuted {
            request_id,
            order_id,
            trades: trades
                .iter()
                .map(|trade| TradeSummary::for_order(trade, order_id))
                .collect(),
        }
    }

    pub(crate) fn trade(isin: &str, trade: &Trade) -> Self {
        Event::Trade {
            isin: isin.to_string(),
            time: trade.time,
            price: trade.price,
            quantity: trade.quantity,
            buy_order_id: trade.buy_order_id,
            sell_order_id: trade.sell_order_id,
        }
    }

    /// Rejection reasons, empty for every other event
    pub fn errors(&self) -> &[RejectReason] {
        match self {
            Event::OrderRejected { errors, .. } => errors,
            _ => &[],
        }
    }
}
