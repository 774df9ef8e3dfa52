//! Core data types for the matching core
//!
//! ## Types
//!
//! - [`Order`]: a resting or incoming order, tagged by [`OrderKind`]
//! - [`Side`]: Buy or Sell
//! - [`Trade`]: an executed match between two orders
//! - [`EnterOrderRq`] / [`DeleteOrderRq`]: inbound requests
//! - [`Event`]: outbound results of a request
//!
//! Prices are integer ticks and quantities whole units, both `u64`.

mod order;
mod trade;
mod request;
mod event;

// Re-export all types at module level
pub use order::{BrokerId, Order, OrderId, OrderKind, ShareholderId, Side, StopStatus};
pub use trade::Trade;
pub use request::{DeleteOrderRq, EnterOrderRq, RequestType};
pub use event::{Event, TradeSummary};
