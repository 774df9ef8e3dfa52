//! Matching engine: matcher, per-instrument orchestration and the registry.
//!
//! ## Matching Rules
//!
//! - **Buy orders** match against sells, lowest price first
//! - **Sell orders** match against buys, highest price first
//! - Trades execute at the **resting** order's price
//! - **Partial fills** are supported; the remainder rests on the book
//! - Self-matching is permitted
//!
//! ## Example
//!
//! ```
//! use matchbook::engine::Exchange;
//! use matchbook::ledger::{Broker, Shareholder};
//! use matchbook::types::{EnterOrderRq, Event, Side};
//! use matchbook::EngineConfig;
//!
//! let exchange = Exchange::new(EngineConfig::default());
//! exchange.ledger().add_broker(Broker::new(1, 1_000_000));
//! let mut holder = Shareholder::new(1);
//! holder.increase_position("ABC", 100);
//! exchange.ledger().add_shareholder(holder);
//! exchange.add_security("ABC", None).unwrap();
//!
//! exchange.handle_enter_order(&EnterOrderRq::new_order(1, "ABC", 1, Side::Sell, 10, 100, 1, 1));
//! let events = exchange.handle_enter_order(&EnterOrderRq::new_order(2, "ABC", 2, Side::Buy, 4, 100, 1, 1));
//!
//! assert!(matches!(events[1], Event::OrderExecuted { order_id: 2, .. }));
//! ```

pub mod matcher;
pub mod validation;
pub mod security;
pub mod exchange;

pub use matcher::{MatchResult, Matcher};
pub use security::Security;
pub use exchange::Exchange;
