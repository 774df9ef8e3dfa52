//! One priority level of a book side.
//!
//! A `PriceLevel` holds every order sharing a ranking key: the limit price
//! in the active book, the stop price in the inactive book. Orders form a
//! doubly-linked FIFO list through the slab:
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! New orders and replenished icebergs are appended at the tail; matching
//! and activation consume from the head.

use slab::Slab;

use crate::orderbook::OrderNode;
use crate::types::Order;

/// Queue metadata for one level. Order data lives in the slab.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Ranking key of this level
    pub price: u64,

    /// Sum of visible quantity at this level
    pub total_quantity: u64,

    /// Oldest order (slab key), matched first
    pub head: Option<usize>,

    /// Newest order (slab key)
    pub tail: Option<usize>,

    /// Number of orders at this level
    pub order_count: usize,
}

impl PriceLevel {
    pub fn new(price: u64) -> Self {
        Self {
            price,
            total_quantity: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Append an order at the tail.
    ///
    /// # Panics
    ///
    /// Panics if the key doesn't exist in the slab
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) {
        let node = slab.get_mut(key).expect("Invalid slab key");
        let quantity = node.visible();

        node.prev = self.tail;
        node.next = None;

        match self.tail {
            Some(tail_key) => {
                slab.get_mut(tail_key).expect("Invalid tail key").next = Some(key);
            }
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity = self.total_quantity.saturating_add(quantity);
    }

    /// Unlink an order from the queue.
    ///
    /// # Returns
    ///
    /// The visible quantity the order contributed
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> u64 {
        let node = slab.get(key).expect("Invalid slab key");
        let quantity = node.visible();
        let prev_key = node.prev;
        let next_key = node.next;

        match prev_key {
            Some(prev) => slab.get_mut(prev).expect("Invalid prev key").next = next_key,
            None => self.head = next_key,
        }
        match next_key {
            Some(next) => slab.get_mut(next).expect("Invalid next key").prev = prev_key,
            None => self.tail = prev_key,
        }

        let node = slab.get_mut(key).expect("Invalid slab key");
        node.prev = None;
        node.next = None;

        self.order_count -= 1;
        self.total_quantity = self.total_quantity.saturating_sub(quantity);

        quantity
    }

    /// Oldest order's slab key
    #[inline]
    pub fn peek_head(&self) -> Option<usize> {
        self.head
    }

    /// Account for visible quantity consumed in place
    pub fn reduce_quantity(&mut self, filled_quantity: u64) {
        self.total_quantity = self.total_quantity.saturating_sub(filled_quantity);
    }

    /// Account for visible quantity added in place
    pub fn add_quantity(&mut self, quantity: u64) {
        self.total_quantity = self.total_quantity.saturating_add(quantity);
    }

    /// Walk the level oldest first
    pub fn iter<'a>(&self, slab: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            slab,
            next: self.head,
        }
    }
}

/// Iterator over the orders of one level, oldest first.
pub struct LevelIter<'a> {
    slab: &'a Slab<OrderNode>,
    next: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.slab.get(self.next?)?;
        self.next = node.next;
        Some(&node.order)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
