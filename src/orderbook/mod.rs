//! Order books for one instrument.
//!
//! ## Architecture
//!
//! Each book is two sides of priority levels over a shared slab:
//!
//! - **Slab-based storage**: O(1) order insertion, removal, and lookup
//! - **Levels**: orders grouped by ranking key using BTreeMap
//! - **Time priority**: FIFO ordering within a level, by entry sequence
//!
//! ## Components
//!
//! - [`OrderNode`]: Wrapper around `Order` with linked-list pointers for its level
//! - [`PriceLevel`]: Collection of orders sharing one key
//! - [`Book`]: Generic two-sided book; [`OrderBook`] and [`InactiveOrderBook`]
//!   are its active (limit price) and inactive (stop price) instances
//! - [`state_root`]: SSZ + SHA-256 digest over both books
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Insert order | O(log n) |
//! | Remove order by id | O(log n) |
//! | Best order | O(log n) |
//! | Fill head order | O(log n) |

pub mod node;
pub mod level;
pub mod book;
pub mod digest;

pub use node::OrderNode;
pub use level::{LevelIter, PriceLevel};
pub use book::{crosses, Active, Book, Fill, Inactive, InactiveOrderBook, OrderBook, Priority};
pub use digest::{state_root, OrderRecord, StateRoot};
