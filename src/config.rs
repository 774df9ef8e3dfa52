//! Engine configuration.
//!
//! Loaded by the bootstrap layer from whatever format it uses; every field
//! has a default, so an empty document yields [`EngineConfig::default`].

use serde::Deserialize;

/// Default pre-allocated slots in each security's active book
pub const DEFAULT_ORDER_CAPACITY: usize = 10_000;

/// Default pre-allocated slots in each security's inactive book
pub const DEFAULT_STOP_ORDER_CAPACITY: usize = 1_000;

/// Sizing of per-security storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Slab capacity of the active order book
    #[serde(default = "default_order_capacity")]
    pub order_capacity: usize,

    /// Slab capacity of the inactive (stop-limit) order book
    #[serde(default = "default_stop_order_capacity")]
    pub stop_order_capacity: usize,
}

fn default_order_capacity() -> usize {
    DEFAULT_ORDER_CAPACITY
}

fn default_stop_order_capacity() -> usize {
    DEFAULT_STOP_ORDER_CAPACITY
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_capacity: DEFAULT_ORDER_CAPACITY,
            stop_order_capacity: DEFAULT_STOP_ORDER_CAPACITY,
        }
    }
}
