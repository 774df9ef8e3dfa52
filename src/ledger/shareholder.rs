//! Shareholder positions, one balance per instrument.

use std::collections::HashMap;

use crate::error::LedgerError;
use crate::types::ShareholderId;

/// A shareholder and its available positions keyed by isin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shareholder {
    pub shareholder_id: ShareholderId,
    positions: HashMap<String, u64>,
}

impl Shareholder {
    pub fn new(shareholder_id: ShareholderId) -> Self {
        Self {
            shareholder_id,
            positions: HashMap::new(),
        }
    }

    /// Available (unreserved) quantity of `isin`
    pub fn position(&self, isin: &str) -> u64 {
        self.positions.get(isin).copied().unwrap_or(0)
    }

    pub fn has_enough_position(&self, isin: &str, quantity: u64) -> bool {
        self.position(isin) >= quantity
    }

    pub fn increase_position(&mut self, isin: &str, quantity: u64) {
        let held = self.positions.entry(isin.to_string()).or_insert(0);
        *held = held.saturating_add(quantity);
    }

    /// Set aside `quantity` of `isin` for a sell order.
    pub fn reserve_position(&mut self, isin: &str, quantity: u64) -> Result<(), LedgerError> {
        let available = self.position(isin);
        let left = available
            .checked_sub(quantity)
            .ok_or(LedgerError::InsufficientPosition {
                required: quantity,
                available,
            })?;
        self.positions.insert(isin.to_string(), left);
        Ok(())
    }

    pub fn release_position(&mut self, isin: &str, quantity: u64) {
        self.increase_position(isin, quantity);
    }

    /// Replace a reservation of `old` with one of `new` in a single step.
    ///
    /// On failure the position is left untouched.
    pub fn swap_position(&mut self, isin: &str, old: u64, new: u64) -> Result<(), LedgerError> {
        if new <= old {
            self.release_position(isin, old - new);
            return Ok(());
        }
        let available = self.position(isin);
        let extra = new - old;
        if available < extra {
            return Err(LedgerError::InsufficientPosition {
                required: new,
                available: available.saturating_add(old),
            });
        }
        self.positions.insert(isin.to_string(), available - extra);
        Ok(())
    }
}
