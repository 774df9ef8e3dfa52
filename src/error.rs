//! Error taxonomy for the matching core.
//!
//! Every user-facing failure is a [`RejectReason`]: detected before any book
//! or ledger mutation, reported in an `OrderRejected` event, never retried.
//! Book and ledger errors are narrower enums that convert into it.

use serde::Serialize;
use thiserror::Error;

use crate::types::OrderId;

/// Malformed or inconsistent request fields.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("order quantity is not positive")]
    NonPositiveQuantity,

    #[error("order price is not positive")]
    NonPositivePrice,

    #[error("peak size is negative")]
    NegativePeakSize,

    #[error("peak size exceeds order quantity")]
    PeakSizeExceedsQuantity,

    #[error("minimum execution quantity is negative")]
    NegativeMinimumExecutionQuantity,

    #[error("minimum execution quantity exceeds order quantity")]
    MinimumExecutionQuantityExceedsQuantity,

    #[error("stop price is not positive")]
    StopPriceNotPositive,

    #[error("stop-limit order cannot have a peak size")]
    StopLimitOrderPeakSizeNotZero,

    #[error("stop-limit order cannot have a minimum execution quantity")]
    StopLimitOrderMeqNotZero,

    #[error("unknown security")]
    UnknownSecurity,

    #[error("unknown broker")]
    UnknownBroker,

    #[error("unknown shareholder")]
    UnknownShareholder,

    #[error("order notional overflows the credit ledger")]
    NotionalOverflow,

    #[error("broker or shareholder of an order cannot change")]
    OwnerChanged,

    #[error("minimum execution quantity cannot change on update")]
    MinimumExecutionQuantityChanged,

    #[error("an active order cannot be given a stop price")]
    StopPriceOnActiveOrder,
}

/// Why a request was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("buyer has not enough credit: required {required}, available {available}")]
    InsufficientCredit { required: u64, available: u64 },

    #[error("seller has not enough positions: required {required}, available {available}")]
    InsufficientPosition { required: u64, available: u64 },

    #[error("minimum execution quantity not met: required {required}, executable {executable}")]
    InsufficientExecutionQuantity { required: u64, executable: u64 },

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("duplicate order id: {0}")]
    DuplicateOrderId(OrderId),
}

/// Order book structural errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("duplicate order id: {0}")]
    DuplicateOrderId(OrderId),
}

impl From<BookError> for RejectReason {
    fn from(err: BookError) -> Self {
        match err {
            BookError::OrderNotFound(id) => RejectReason::OrderNotFound(id),
            BookError::DuplicateOrderId(id) => RejectReason::DuplicateOrderId(id),
        }
    }
}

/// Ledger refusals.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient credit: required {required}, available {available}")]
    InsufficientCredit { required: u64, available: u64 },

    #[error("insufficient position: required {required}, available {available}")]
    InsufficientPosition { required: u64, available: u64 },

    #[error("unknown broker: {0}")]
    UnknownBroker(u64),

    #[error("unknown shareholder: {0}")]
    UnknownShareholder(u64),
}

impl From<LedgerError> for RejectReason {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientCredit { required, available } => {
                RejectReason::InsufficientCredit { required, available }
            }
            LedgerError::InsufficientPosition { required, available } => {
                RejectReason::InsufficientPosition { required, available }
            }
            LedgerError::UnknownBroker(_) => ValidationError::UnknownBroker.into(),
            LedgerError::UnknownShareholder(_) => ValidationError::UnknownShareholder.into(),
        }
    }
}

/// Security registry refusals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("security already registered: {0}")]
    DuplicateSecurity(String),
}

/// Failure to compute the book digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("state encoding failed: {0}")]
pub struct DigestError(pub String);
