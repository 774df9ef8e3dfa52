//! Broker credit account.

use crate::error::LedgerError;
use crate::types::BrokerId;

/// A broker and its available credit.
///
/// Credit is `u64` so it can never go negative; a reservation that would
/// overdraw it is refused instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broker {
    pub broker_id: BrokerId,
    credit: u64,
}

impl Broker {
    pub fn new(broker_id: BrokerId, credit: u64) -> Self {
        Self { broker_id, credit }
    }

    /// Currently available (unreserved) credit
    #[inline]
    pub fn credit(&self) -> u64 {
        self.credit
    }

    #[inline]
    pub fn has_enough_credit(&self, amount: u64) -> bool {
        self.credit >= amount
    }

    /// Take `amount` out of the available credit.
    pub fn reserve_credit(&mut self, amount: u64) -> Result<(), LedgerError> {
        self.credit = self
            .credit
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientCredit {
                required: amount,
                available: self.credit,
            })?;
        Ok(())
    }

    /// Return previously reserved credit.
    pub fn release_credit(&mut self, amount: u64) {
        self.credit = self.credit.saturating_add(amount);
    }

    /// Credit proceeds of a sale.
    pub fn increase_credit(&mut self, amount: u64) {
        self.credit = self.credit.saturating_add(amount);
    }

    /// Replace a reservation of `old` with one of `new` in a single step.
    ///
    /// On failure the broker is left untouched.
    pub fn swap_credit(&mut self, old: u64, new: u64) -> Result<(), LedgerError> {
        if new <= old {
            self.release_credit(old - new);
            return Ok(());
        }
        let extra = new - old;
        if !self.has_enough_credit(extra) {
            return Err(LedgerError::InsufficientCredit {
                required: new,
                available: self.credit.saturating_add(old),
            });
        }
        self.credit -= extra;
        Ok(())
    }
}
