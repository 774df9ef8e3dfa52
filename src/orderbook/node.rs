//! Order node for slab-based storage.
//!
//! `OrderNode` wraps an `Order` with doubly-linked list pointers so it can
//! be unlinked from its level in O(1) given its slab key.
//!
//! - `next`: the next (younger) order at the same level
//! - `prev`: the previous (older) order at the same level

use crate::types::{Order, OrderId};

/// Order node stored in a book's slab.
///
/// The pointers are slab keys (`usize`), not references.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The resting order
    pub order: Order,

    /// Younger neighbour, None at the tail
    pub next: Option<usize>,

    /// Older neighbour, None at the head
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Create an unlinked node
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }

    /// Visible quantity, the amount a level advertises
    #[inline]
    pub fn visible(&self) -> u64 {
        self.order.quantity
    }
}
