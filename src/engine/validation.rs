//! Request field validation.
//!
//! Every check runs; the caller reports all failures at once.

use crate::error::{RejectReason, ValidationError};
use crate::ledger::Ledger;
use crate::types::{EnterOrderRq, Order, Side};

/// Check the fields of an enter-order request and the existence of its
/// broker and shareholder.
pub fn validate_enter_order(rq: &EnterOrderRq, ledger: &Ledger) -> Vec<RejectReason> {
    let mut errors = Vec::new();
    let mut fail = |err: ValidationError| errors.push(RejectReason::Validation(err));

    if rq.quantity <= 0 {
        fail(ValidationError::NonPositiveQuantity);
    }
    if rq.price <= 0 {
        fail(ValidationError::NonPositivePrice);
    }

    if rq.peak_size < 0 {
        fail(ValidationError::NegativePeakSize);
    } else if rq.quantity > 0 && rq.peak_size > rq.quantity {
        fail(ValidationError::PeakSizeExceedsQuantity);
    }

    if rq.min_execution_quantity < 0 {
        fail(ValidationError::NegativeMinimumExecutionQuantity);
    } else if rq.quantity > 0 && rq.min_execution_quantity > rq.quantity {
        fail(ValidationError::MinimumExecutionQuantityExceedsQuantity);
    }

    if rq.stop_price < 0 {
        fail(ValidationError::StopPriceNotPositive);
    } else if rq.stop_price > 0 {
        if rq.peak_size != 0 {
            fail(ValidationError::StopLimitOrderPeakSizeNotZero);
        }
        if rq.min_execution_quantity != 0 {
            fail(ValidationError::StopLimitOrderMeqNotZero);
        }
    }

    if rq.side == Side::Buy
        && rq.quantity > 0
        && rq.price > 0
        && (rq.price as u64).checked_mul(rq.quantity as u64).is_none()
    {
        fail(ValidationError::NotionalOverflow);
    }

    if !ledger.has_broker(rq.broker_id) {
        fail(ValidationError::UnknownBroker);
    }
    if !ledger.has_shareholder(rq.shareholder_id) {
        fail(ValidationError::UnknownShareholder);
    }

    errors
}

/// Build the order a validated request describes.
///
/// Only call after [`validate_enter_order`] returned no errors.
pub fn order_from_request(rq: &EnterOrderRq) -> Order {
    Order::new(
        rq.order_id,
        rq.side,
        rq.price as u64,
        rq.quantity as u64,
        rq.broker_id,
        rq.shareholder_id,
        rq.entry_time,
    )
    .with_peak_size(rq.peak_size as u64)
    .with_min_execution_quantity(rq.min_execution_quantity as u64)
    .with_stop_price(rq.stop_price as u64)
}
