//! # matchbook
//!
//! Matching core of a single-exchange order-matching simulator.
//!
//! ## Architecture
//!
//! - **Types**: Orders, trades, inbound requests, outbound events
//! - **Ledger**: Broker credit and shareholder positions, reserved on entry
//!   and settled per trade
//! - **OrderBook**: Active and inactive (stop-limit) books with slab storage
//! - **Engine**: Matcher, per-instrument [`Security`] and the [`Exchange`]
//!   registry
//!
//! ## Design Principles
//!
//! 1. **Determinism**: Same request stream, same events and state root
//! 2. **Integer Ticks**: Prices and quantities are `u64`, no floating point
//! 3. **Pre-allocated Memory**: Slab allocation for O(1) order operations
//! 4. **Synchronous Execution**: Events are returned, never published

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, Trade, requests, events
pub mod types;

/// Rejection reasons and component errors
pub mod error;

/// Broker credit and shareholder position ledger
pub mod ledger;

/// Order books with slab-based storage
pub mod orderbook;

/// Matcher, security orchestration and registry
pub mod engine;

/// Engine sizing
pub mod config;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::EngineConfig;
pub use engine::{Exchange, MatchResult, Matcher, Security};
pub use error::{RegistryError, RejectReason, ValidationError};
pub use ledger::{Broker, Ledger, Reservation, Shareholder};
pub use orderbook::{InactiveOrderBook, OrderBook, StateRoot};
pub use types::{DeleteOrderRq, EnterOrderRq, Event, Order, OrderKind, Side, Trade};
