//! Priority-ordered order books.
//!
//! ## Architecture
//!
//! - **Slab**: pre-allocated order storage, O(1) insert/remove/lookup
//! - **BTreeMap**: levels per side keyed by the ranking key
//! - **HashMap**: order id to slab key, for O(1) cancel
//!
//! One implementation serves both books; the [`Priority`] parameter picks
//! the ranking key and its direction per side:
//!
//! | Book | Side | Key | Best first |
//! |------|------|-----|------------|
//! | [`OrderBook`] | Buy | limit price | highest |
//! | [`OrderBook`] | Sell | limit price | lowest |
//! | [`InactiveOrderBook`] | Buy | stop price | lowest |
//! | [`InactiveOrderBook`] | Sell | stop price | highest |
//!
//! Within a level orders are FIFO by entry sequence.
//!
//! ## Example
//!
//! ```
//! use matchbook::orderbook::OrderBook;
//! use matchbook::types::{Order, Side};
//!
//! let mut book = OrderBook::with_capacity(16);
//! book.insert(Order::new(1, Side::Buy, 15_700, 304, 0, 1, 0)).unwrap();
//! book.insert(Order::new(6, Side::Sell, 15_800, 350, 0, 1, 0)).unwrap();
//!
//! assert_eq!(book.best_bid(), Some(15_700));
//! assert_eq!(book.best_ask(), Some(15_800));
//! // a buy taker meets the best sell
//! assert_eq!(book.peek_best(Side::Buy).map(|o| o.id), Some(6));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use slab::Slab;

use crate::error::BookError;
use crate::orderbook::{OrderNode, PriceLevel};
use crate::types::{Order, OrderId, Side};

// ============================================================================
// Priority
// ============================================================================

/// Ranking rule of a book.
pub trait Priority {
    /// Key the order is ranked by
    fn key(order: &Order) -> u64;

    /// Whether a larger key ranks first on `side`
    fn descending(side: Side) -> bool;
}

/// Trade priority: best limit price first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Active;

impl Priority for Active {
    fn key(order: &Order) -> u64 {
        order.price
    }

    fn descending(side: Side) -> bool {
        side == Side::Buy
    }
}

/// Activation priority: the stop nearest to firing first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inactive;

impl Priority for Inactive {
    fn key(order: &Order) -> u64 {
        order.stop_price().unwrap_or_default()
    }

    fn descending(side: Side) -> bool {
        side == Side::Sell
    }
}

/// Book of active orders, matched against by incoming orders
pub type OrderBook = Book<Active>;

/// Book of stop-limit orders waiting for their trigger
pub type InactiveOrderBook = Book<Inactive>;

// ============================================================================
// Ladder (one side)
// ============================================================================

#[derive(Debug)]
struct Ladder {
    levels: BTreeMap<u64, PriceLevel>,
    descending: bool,
    count: usize,
}

impl Ladder {
    fn new(descending: bool) -> Self {
        Self {
            levels: BTreeMap::new(),
            descending,
            count: 0,
        }
    }

    fn best(&self) -> Option<&PriceLevel> {
        if self.descending {
            self.levels.values().next_back()
        } else {
            self.levels.values().next()
        }
    }

    fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        if self.descending {
            Box::new(self.levels.values().rev())
        } else {
            Box::new(self.levels.values())
        }
    }
}

/// What happened to a resting order after a fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fill {
    /// Visible quantity left, position kept
    Partial,
    /// Iceberg refilled from its reserve and moved to the back of its level
    Replenished,
    /// Fully consumed and removed from the book
    Removed(Order),
}

// ============================================================================
// Book
// ============================================================================

/// Two priority-ordered sides of resting orders.
#[derive(Debug)]
pub struct Book<P: Priority> {
    /// Order storage, keyed by slab index
    orders: Slab<OrderNode>,

    buys: Ladder,

    sells: Ladder,

    /// Order id to slab key
    index: HashMap<OrderId, usize>,

    /// Next entry sequence to stamp
    next_sequence: u64,

    _priority: PhantomData<P>,
}

impl<P: Priority> Default for Book<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Priority> Book<P> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with `order_capacity` pre-allocated slots
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            buys: Ladder::new(P::descending(Side::Buy)),
            sells: Ladder::new(P::descending(Side::Sell)),
            index: HashMap::with_capacity(order_capacity),
            next_sequence: 1,
            _priority: PhantomData,
        }
    }

    fn ladder(&self, side: Side) -> &Ladder {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
        }
    }

    fn ladder_mut(&mut self, side: Side) -> &mut Ladder {
        match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        }
    }

    fn stamp(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Total number of orders in the book
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders on one side
    #[inline]
    pub fn side_count(&self, side: Side) -> usize {
        self.ladder(side).count
    }

    /// Number of distinct levels on one side
    #[inline]
    pub fn level_count(&self, side: Side) -> usize {
        self.ladder(side).levels.len()
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Insert an order at the tail of its level, stamping a fresh entry
    /// sequence.
    pub fn insert(&mut self, mut order: Order) -> Result<(), BookError> {
        if self.index.contains_key(&order.id) {
            return Err(BookError::DuplicateOrderId(order.id));
        }
        order.sequence = self.stamp();

        let order_id = order.id;
        let side = order.side;
        let key = P::key(&order);

        let slot = self.orders.insert(OrderNode::new(order));
        self.index.insert(order_id, slot);

        let ladder = match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        };
        ladder
            .levels
            .entry(key)
            .or_insert_with(|| PriceLevel::new(key))
            .push_back(slot, &mut self.orders);
        ladder.count += 1;
        Ok(())
    }

    /// Remove an order by id.
    pub fn remove(&mut self, order_id: OrderId) -> Result<Order, BookError> {
        let slot = *self
            .index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound(order_id))?;
        Ok(self.remove_slot(slot))
    }

    fn remove_slot(&mut self, slot: usize) -> Order {
        let node = &self.orders[slot];
        let side = node.order.side;
        let key = P::key(&node.order);
        let order_id = node.order_id();

        let ladder = match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        };
        let level = ladder.levels.get_mut(&key).expect("resting order without a level");
        level.remove(slot, &mut self.orders);
        if level.is_empty() {
            ladder.levels.remove(&key);
        }
        ladder.count -= 1;

        self.index.remove(&order_id);
        self.orders.remove(slot).order
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        let slot = self.index.get(&order_id)?;
        self.orders.get(*slot).map(|node| &node.order)
    }

    #[inline]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    /// Lower a resting order's total remaining quantity in place, keeping
    /// its position in the queue. An iceberg's visible part is never refilled.
    pub fn reduce_total_quantity(&mut self, order_id: OrderId, total: u64) -> Result<(), BookError> {
        let slot = *self
            .index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound(order_id))?;
        let node = &mut self.orders[slot];
        let before = node.visible();
        node.order.reduce_total_quantity(total);
        let after = node.visible();
        let side = node.order.side;
        let key = P::key(&node.order);

        let level = self
            .ladder_mut(side)
            .levels
            .get_mut(&key)
            .expect("resting order without a level");
        level.reduce_quantity(before);
        level.add_quantity(after);
        Ok(())
    }

    // ========================================================================
    // Best Prices
    // ========================================================================

    /// Highest-priority order a taker on `taker_side` would meet: the head of
    /// the best level on the opposite side.
    pub fn peek_best(&self, taker_side: Side) -> Option<&Order> {
        let slot = self.ladder(taker_side.opposite()).best()?.peek_head()?;
        self.orders.get(slot).map(|node| &node.order)
    }

    /// Top-of-book key of the given resting side
    #[inline]
    pub fn best_price(&self, side: Side) -> Option<u64> {
        self.ladder(side).best().map(|level| level.price)
    }

    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.best_price(Side::Buy)
    }

    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.best_price(Side::Sell)
    }

    /// Visible quantity resting at `price` on `side`
    pub fn depth_at(&self, side: Side, price: u64) -> u64 {
        self.ladder(side)
            .levels
            .get(&price)
            .map_or(0, |level| level.total_quantity)
    }

    /// Orders of one side in priority order
    pub fn iter(&self, side: Side) -> impl Iterator<Item = &Order> + '_ {
        let orders = &self.orders;
        self.ladder(side)
            .levels()
            .flat_map(move |level| level.iter(orders))
    }

    /// Order ids of one side in priority order
    pub fn order_ids(&self, side: Side) -> Vec<OrderId> {
        self.iter(side).map(|order| order.id).collect()
    }

    // ========================================================================
    // Consumption
    // ========================================================================

    /// Fill `quantity` of the head order on `side`.
    ///
    /// An exhausted iceberg with reserve left is refilled up to its peak and
    /// moved to the back of its level with a fresh sequence; any other
    /// exhausted order is removed.
    ///
    /// # Panics
    ///
    /// Panics if the side is empty or `quantity` exceeds the head's visible
    /// quantity.
    pub fn fill_best(&mut self, side: Side, quantity: u64) -> Fill {
        let (key, slot) = {
            let level = self.ladder(side).best().expect("fill on an empty side");
            (level.price, level.peek_head().expect("empty level in book"))
        };

        let node = &mut self.orders[slot];
        assert!(quantity <= node.visible(), "fill exceeds visible quantity");
        node.order.fill(quantity);
        let exhausted = node.visible() == 0;

        let level = self
            .ladder_mut(side)
            .levels
            .get_mut(&key)
            .expect("best level vanished");
        level.reduce_quantity(quantity);

        if !exhausted {
            return Fill::Partial;
        }
        if self.orders[slot].order.replenish() {
            let sequence = self.stamp();
            let ladder = match side {
                Side::Buy => &mut self.buys,
                Side::Sell => &mut self.sells,
            };
            let level = ladder.levels.get_mut(&key).expect("best level vanished");
            // Unlink while the level still counts it as zero visible, relink
            // with the refilled amount.
            let refilled = self.orders[slot].visible();
            self.orders[slot].order.quantity = 0;
            level.remove(slot, &mut self.orders);
            self.orders[slot].order.quantity = refilled;
            self.orders[slot].order.sequence = sequence;
            level.push_back(slot, &mut self.orders);
            return Fill::Replenished;
        }
        Fill::Removed(self.remove_slot(slot))
    }

}

impl Book<Active> {
    /// Quantity a taker could execute right now: the total (visible plus
    /// hidden) quantity of every crossing order, capped at the taker's own
    /// total quantity. Does not mutate the book.
    pub fn executable_quantity(&self, taker: &Order) -> u64 {
        let wanted = taker.total_quantity();
        let mut available = 0u64;
        for resting in self.iter(taker.side.opposite()) {
            if !crosses(taker, resting.price) || available >= wanted {
                break;
            }
            available = available.saturating_add(resting.total_quantity());
        }
        available.min(wanted)
    }
}

impl Book<Inactive> {
    /// Remove and return the highest-priority stop order whose condition
    /// holds at `market_price`. When both sides have one, the older wins.
    pub fn pop_triggered(&mut self, market_price: Option<u64>) -> Option<Order> {
        let candidate = |side: Side| {
            self.ladder(side)
                .best()
                .and_then(|level| level.peek_head())
                .map(|slot| &self.orders[slot].order)
                .filter(|order| order.stop_triggered(market_price))
                .map(|order| (order.sequence, order.id))
        };

        let chosen = match (candidate(Side::Buy), candidate(Side::Sell)) {
            (Some(buy), Some(sell)) => Some(buy.min(sell)),
            (buy, sell) => buy.or(sell),
        };
        let (_, order_id) = chosen?;
        self.remove(order_id).ok()
    }

    /// Whether any stop order is currently triggered
    pub fn has_triggered(&self, market_price: Option<u64>) -> bool {
        [Side::Buy, Side::Sell].into_iter().any(|side| {
            self.ladder(side)
                .best()
                .and_then(|level| level.peek_head())
                .is_some_and(|slot| self.orders[slot].order.stop_triggered(market_price))
        })
    }
}

/// Whether `taker` would trade against a resting order at `resting_price`
#[inline]
pub fn crosses(taker: &Order, resting_price: u64) -> bool {
    match taker.side {
        Side::Buy => taker.price >= resting_price,
        Side::Sell => taker.price <= resting_price,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
