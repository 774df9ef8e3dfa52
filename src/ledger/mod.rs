//! Credit and position ledgers.
//!
//! ## Design
//!
//! Brokers and shareholders live in an arena addressed by their integer id.
//! Orders store only the id; every mutation goes through [`Ledger`] using a
//! [`Reservation`] describing what an order holds.
//!
//! ## Locking
//!
//! Each entity sits behind its own `parking_lot::Mutex`, so two securities
//! touching the same broker serialize on that broker only. No operation here
//! holds two entity locks at once.
//!
//! ## Reservation protocol
//!
//! - BUY order: `price * total quantity` of the broker's credit
//! - SELL order: `total quantity` of the shareholder's position
//!
//! A reservation is taken on admission, held while the order rests (active
//! or inactive), adjusted to the executed notional on settlement and
//! released on delete.

mod broker;
mod shareholder;

pub use broker::Broker;
pub use shareholder::Shareholder;

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{LedgerError, ValidationError};
use crate::types::{BrokerId, Order, ShareholderId, Side, Trade};

/// What an order holds in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    Credit {
        broker_id: BrokerId,
        amount: u64,
    },
    Position {
        shareholder_id: ShareholderId,
        isin: String,
        quantity: u64,
    },
}

impl Reservation {
    /// The reservation backing the full remaining quantity of `order`.
    pub fn for_order(order: &Order, isin: &str) -> Result<Self, ValidationError> {
        match order.side {
            Side::Buy => {
                let amount = order
                    .price
                    .checked_mul(order.total_quantity())
                    .ok_or(ValidationError::NotionalOverflow)?;
                Ok(Reservation::Credit {
                    broker_id: order.broker_id,
                    amount,
                })
            }
            Side::Sell => Ok(Reservation::Position {
                shareholder_id: order.shareholder_id,
                isin: isin.to_string(),
                quantity: order.total_quantity(),
            }),
        }
    }

    /// Reserved amount (credit or quantity)
    pub fn amount(&self) -> u64 {
        match self {
            Reservation::Credit { amount, .. } => *amount,
            Reservation::Position { quantity, .. } => *quantity,
        }
    }
}

/// Arena of brokers and shareholders.
#[derive(Debug, Default)]
pub struct Ledger {
    brokers: RwLock<HashMap<BrokerId, Mutex<Broker>>>,
    shareholders: RwLock<HashMap<ShareholderId, Mutex<Shareholder>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Registration and lookup
    // ========================================================================

    /// Register (or replace) a broker.
    pub fn add_broker(&self, broker: Broker) {
        self.brokers.write().insert(broker.broker_id, Mutex::new(broker));
    }

    /// Register (or replace) a shareholder.
    pub fn add_shareholder(&self, shareholder: Shareholder) {
        self.shareholders
            .write()
            .insert(shareholder.shareholder_id, Mutex::new(shareholder));
    }

    pub fn has_broker(&self, broker_id: BrokerId) -> bool {
        self.brokers.read().contains_key(&broker_id)
    }

    pub fn has_shareholder(&self, shareholder_id: ShareholderId) -> bool {
        self.shareholders.read().contains_key(&shareholder_id)
    }

    /// Snapshot of a broker's available credit
    pub fn credit(&self, broker_id: BrokerId) -> Option<u64> {
        self.brokers.read().get(&broker_id).map(|b| b.lock().credit())
    }

    /// Snapshot of a shareholder's available position in `isin`
    pub fn position(&self, shareholder_id: ShareholderId, isin: &str) -> Option<u64> {
        self.shareholders
            .read()
            .get(&shareholder_id)
            .map(|s| s.lock().position(isin))
    }

    /// Run `f` with exclusive access to one broker.
    pub fn with_broker<R>(
        &self,
        broker_id: BrokerId,
        f: impl FnOnce(&mut Broker) -> R,
    ) -> Result<R, LedgerError> {
        let brokers = self.brokers.read();
        let broker = brokers
            .get(&broker_id)
            .ok_or(LedgerError::UnknownBroker(broker_id))?;
        let mut guard = broker.lock();
        Ok(f(&mut guard))
    }

    /// Run `f` with exclusive access to one shareholder.
    pub fn with_shareholder<R>(
        &self,
        shareholder_id: ShareholderId,
        f: impl FnOnce(&mut Shareholder) -> R,
    ) -> Result<R, LedgerError> {
        let shareholders = self.shareholders.read();
        let shareholder = shareholders
            .get(&shareholder_id)
            .ok_or(LedgerError::UnknownShareholder(shareholder_id))?;
        let mut guard = shareholder.lock();
        Ok(f(&mut guard))
    }

    // ========================================================================
    // Reservation protocol
    // ========================================================================

    /// Take a reservation. All-or-nothing.
    pub fn reserve(&self, reservation: &Reservation) -> Result<(), LedgerError> {
        match reservation {
            Reservation::Credit { broker_id, amount } => {
                self.with_broker(*broker_id, |b| b.reserve_credit(*amount))??
            }
            Reservation::Position { shareholder_id, isin, quantity } => {
                self.with_shareholder(*shareholder_id, |s| s.reserve_position(isin, *quantity))??
            }
        }
        debug!(?reservation, "reserved");
        Ok(())
    }

    /// Give a reservation back.
    pub fn release(&self, reservation: &Reservation) -> Result<(), LedgerError> {
        match reservation {
            Reservation::Credit { broker_id, amount } => {
                self.with_broker(*broker_id, |b| b.release_credit(*amount))?
            }
            Reservation::Position { shareholder_id, isin, quantity } => {
                self.with_shareholder(*shareholder_id, |s| s.release_position(isin, *quantity))?
            }
        }
        debug!(?reservation, "released");
        Ok(())
    }

    /// Replace `old` with `new`. If `new` cannot be held, `old` stays in place
    /// and nothing changes.
    pub fn swap(&self, old: &Reservation, new: &Reservation) -> Result<(), LedgerError> {
        match (old, new) {
            (
                Reservation::Credit { broker_id: a, amount: old_amount },
                Reservation::Credit { broker_id: b, amount: new_amount },
            ) if a == b => self.with_broker(*a, |br| br.swap_credit(*old_amount, *new_amount))??,
            (
                Reservation::Position { shareholder_id: a, isin: isin_a, quantity: old_qty },
                Reservation::Position { shareholder_id: b, isin: isin_b, quantity: new_qty },
            ) if a == b && isin_a == isin_b => {
                self.with_shareholder(*a, |s| s.swap_position(isin_a, *old_qty, *new_qty))??
            }
            _ => {
                // Different accounts: take the new one first so a refusal
                // leaves the old one intact.
                self.reserve(new)?;
                self.release(old)?;
            }
        }
        Ok(())
    }

    /// Settle one trade.
    ///
    /// `reserved_price` is the limit price the buy side reserved credit at.
    /// The buyer is refunded the price improvement, the seller's broker is
    /// credited the notional, and the buyer's shareholder receives the
    /// shares. The seller's position was already taken at reservation.
    pub fn settle(&self, trade: &Trade, reserved_price: u64, isin: &str) -> Result<(), LedgerError> {
        assert!(
            reserved_price >= trade.price,
            "buy side traded above its reserved price"
        );
        let refund = (reserved_price - trade.price) * trade.quantity;
        let notional = u64::try_from(trade.notional())
            .expect("notional bounded by the buy side's reservation");

        if refund > 0 {
            self.with_broker(trade.buy_broker_id, |b| b.release_credit(refund))?;
        }
        self.with_broker(trade.sell_broker_id, |b| b.increase_credit(notional))?;
        self.with_shareholder(trade.buy_shareholder_id, |s| {
            s.increase_position(isin, trade.quantity)
        })?;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
