//! Deterministic digest of a security's book state.
//!
//! Every resting order of both books is flattened into an SSZ
//! [`OrderRecord`], walked in priority order, and fed to SHA-256 together
//! with the market price. Two securities that received the same request
//! stream produce the same root.

use std::fmt;

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::error::DigestError;
use crate::orderbook::{Book, InactiveOrderBook, OrderBook, Priority};
use crate::types::{Order, Side};

/// Fixed-size encoding of one resting order.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct OrderRecord {
    /// 0 = active book, 1 = inactive book
    pub book: u8,
    pub side: u8,
    pub kind: u8,
    pub id: u64,
    pub price: u64,
    pub quantity: u64,
    pub hidden_quantity: u64,
    pub peak_size: u64,
    pub stop_price: u64,
    pub min_execution_quantity: u64,
    pub sequence: u64,
    pub broker_id: u64,
    pub shareholder_id: u64,
}

impl OrderRecord {
    pub fn new(book: u8, order: &Order) -> Self {
        Self {
            book,
            side: order.side.to_u8(),
            kind: order.kind.to_u8(),
            id: order.id,
            price: order.price,
            quantity: order.quantity,
            hidden_quantity: order.hidden_quantity(),
            peak_size: order.peak_size(),
            stop_price: order.stop_price().unwrap_or_default(),
            min_execution_quantity: order.min_execution_quantity,
            sequence: order.sequence,
            broker_id: order.broker_id,
            shareholder_id: order.shareholder_id,
        }
    }
}

/// 32-byte SHA-256 state root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateRoot(pub [u8; 32]);

impl StateRoot {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn absorb<P: Priority>(hasher: &mut Sha256, tag: u8, book: &Book<P>) -> Result<(), DigestError> {
    for side in [Side::Buy, Side::Sell] {
        for order in book.iter(side) {
            let record = OrderRecord::new(tag, order);
            let bytes = ssz_rs::serialize(&record).map_err(|e| DigestError(format!("{:?}", e)))?;
            hasher.update(&bytes);
        }
    }
    Ok(())
}

/// Compute the state root over both books and the market price.
pub fn state_root(
    active: &OrderBook,
    inactive: &InactiveOrderBook,
    market_price: Option<u64>,
) -> Result<StateRoot, DigestError> {
    let mut hasher = Sha256::new();
    absorb(&mut hasher, 0, active)?;
    absorb(&mut hasher, 1, inactive)?;
    hasher.update(market_price.unwrap_or_default().to_le_bytes());

    let mut root = [0u8; 32];
    root.copy_from_slice(&hasher.finalize());
    Ok(StateRoot(root))
}
