//! Inbound requests, as handed over by the routing layer.
//!
//! Numeric order fields are signed: the transport may carry negative
//! values and those must surface as validation errors, not wrap around.

use serde::Deserialize;

use crate::types::{BrokerId, OrderId, ShareholderId, Side};

/// Whether an enter-order request creates or amends an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    NewOrder,
    UpdateOrder,
}

/// New-order or update-order request.
///
/// ## Example
///
/// ```
/// use matchbook::types::{EnterOrderRq, Side};
///
/// let rq = EnterOrderRq::new_order(1, "ABC", 11, Side::Buy, 10, 15_000, 0, 1)
///     .with_stop_price(16_000);
/// assert_eq!(rq.stop_price, 16_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnterOrderRq {
    pub request_type: RequestType,
    pub request_id: u64,
    pub isin: String,
    pub order_id: OrderId,
    #[serde(default)]
    pub entry_time: u64,
    pub side: Side,
    pub quantity: i64,
    pub price: i64,
    pub broker_id: BrokerId,
    pub shareholder_id: ShareholderId,
    #[serde(default)]
    pub peak_size: i64,
    #[serde(default)]
    pub min_execution_quantity: i64,
    /// 0 = not a stop-limit order
    #[serde(default)]
    pub stop_price: i64,
}

impl EnterOrderRq {
    /// Create a new-order request for a plain limit order.
    #[allow(clippy::too_many_arguments)]
    pub fn new_order(
        request_id: u64,
        isin: impl Into<String>,
        order_id: OrderId,
        side: Side,
        quantity: i64,
        price: i64,
        broker_id: BrokerId,
        shareholder_id: ShareholderId,
    ) -> Self {
        Self {
            request_type: RequestType::NewOrder,
            request_id,
            isin: isin.into(),
            order_id,
            entry_time: 0,
            side,
            quantity,
            price,
            broker_id,
            shareholder_id,
            peak_size: 0,
            min_execution_quantity: 0,
            stop_price: 0,
        }
    }

    /// Create an update request for an existing order.
    #[allow(clippy::too_many_arguments)]
    pub fn update_order(
        request_id: u64,
        isin: impl Into<String>,
        order_id: OrderId,
        side: Side,
        quantity: i64,
        price: i64,
        broker_id: BrokerId,
        shareholder_id: ShareholderId,
    ) -> Self {
        Self {
            request_type: RequestType::UpdateOrder,
            ..Self::new_order(request_id, isin, order_id, side, quantity, price, broker_id, shareholder_id)
        }
    }

    pub fn with_entry_time(mut self, entry_time: u64) -> Self {
        self.entry_time = entry_time;
        self
    }

    pub fn with_peak_size(mut self, peak_size: i64) -> Self {
        self.peak_size = peak_size;
        self
    }

    pub fn with_min_execution_quantity(mut self, meq: i64) -> Self {
        self.min_execution_quantity = meq;
        self
    }

    pub fn with_stop_price(mut self, stop_price: i64) -> Self {
        self.stop_price = stop_price;
        self
    }
}

/// Delete-order request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteOrderRq {
    pub request_id: u64,
    pub isin: String,
    pub side: Side,
    pub order_id: OrderId,
}

impl DeleteOrderRq {
    pub fn new(request_id: u64, isin: impl Into<String>, side: Side, order_id: OrderId) -> Self {
        Self {
            request_id,
            isin: isin.into(),
            side,
            order_id,
        }
    }
}
