//! Order types for the matching core.
//!
//! An [`Order`] is one common record plus an [`OrderKind`] tag carrying the
//! variant-specific state:
//!
//! - `Plain`: the whole remaining quantity is visible
//! - `Iceberg`: only up to `peak_size` is visible, the rest sits in `hidden`
//! - `Stop`: a stop-limit order, quiescent until the market price reaches
//!   its `stop_price`, after which it behaves as a plain limit order
//!
//! Behavior is selected by matching on the tag. Prices are integer ticks,
//! quantities are whole units.

use serde::{Deserialize, Serialize};

/// Order identifier, unique per instrument
pub type OrderId = u64;

/// Broker identifier in the ledger arena
pub type BrokerId = u64;

/// Shareholder identifier in the ledger arena
pub type ShareholderId = u64;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 in the state digest:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    #[default]
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

// ============================================================================
// OrderKind
// ============================================================================

/// Activation state of a stop-limit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StopStatus {
    /// Waiting in the inactive book for its trigger
    Inactive,
    /// Triggered; trades like a plain limit order from now on
    Active,
}

/// Variant-specific order state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderKind {
    /// Plain limit order
    #[default]
    Plain,
    /// Iceberg order with a visible cap and a hidden reserve
    Iceberg { peak_size: u64, hidden: u64 },
    /// Stop-limit order
    Stop { stop_price: u64, status: StopStatus },
}

impl OrderKind {
    /// Discriminant used by the state digest
    pub fn to_u8(self) -> u8 {
        match self {
            OrderKind::Plain => 0,
            OrderKind::Iceberg { .. } => 1,
            OrderKind::Stop { status: StopStatus::Inactive, .. } => 2,
            OrderKind::Stop { status: StopStatus::Active, .. } => 3,
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A limit order, resting or incoming.
///
/// `quantity` is the visible remaining quantity. For icebergs the total
/// remaining quantity is `quantity + hidden`; see [`Order::total_quantity`].
///
/// ## Example
///
/// ```
/// use matchbook::types::{Order, Side};
///
/// let order = Order::new(1, Side::Buy, 15_700, 304, 0, 1, 0)
///     .with_peak_size(100);
///
/// assert_eq!(order.quantity, 100);
/// assert_eq!(order.hidden_quantity(), 204);
/// assert_eq!(order.total_quantity(), 304);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Order {
    /// Order identifier, unique per instrument
    pub id: OrderId,

    /// Buy or Sell
    pub side: Side,

    /// Limit price in ticks
    pub price: u64,

    /// Visible remaining quantity
    pub quantity: u64,

    /// Variant tag and its state
    pub kind: OrderKind,

    /// Minimum quantity that must execute on admission (0 = none)
    pub min_execution_quantity: u64,

    /// Entry timestamp supplied by the request (ms)
    pub entry_time: u64,

    /// Entry sequence stamped by the book holding the order.
    /// Lower means older; refreshed whenever the order loses time priority.
    pub sequence: u64,

    /// Owning broker (credit ledger)
    pub broker_id: BrokerId,

    /// Owning shareholder (position ledger)
    pub shareholder_id: ShareholderId,
}

impl Order {
    /// Create a plain limit order.
    pub fn new(
        id: OrderId,
        side: Side,
        price: u64,
        quantity: u64,
        broker_id: BrokerId,
        shareholder_id: ShareholderId,
        entry_time: u64,
    ) -> Self {
        Self {
            id,
            side,
            price,
            quantity,
            kind: OrderKind::Plain,
            min_execution_quantity: 0,
            entry_time,
            sequence: 0,
            broker_id,
            shareholder_id,
        }
    }

    /// Turn this order into an iceberg with the given peak size.
    ///
    /// A peak size of 0 leaves the order plain.
    pub fn with_peak_size(mut self, peak_size: u64) -> Self {
        if peak_size > 0 {
            let total = self.total_quantity();
            self.kind = OrderKind::Iceberg { peak_size, hidden: 0 };
            self.set_total_quantity(total);
        }
        self
    }

    /// Set the minimum execution quantity.
    pub fn with_min_execution_quantity(mut self, meq: u64) -> Self {
        self.min_execution_quantity = meq;
        self
    }

    /// Turn this order into an inactive stop-limit order.
    ///
    /// A stop price of 0 leaves the order untouched.
    pub fn with_stop_price(mut self, stop_price: u64) -> Self {
        if stop_price > 0 {
            self.kind = OrderKind::Stop {
                stop_price,
                status: StopStatus::Inactive,
            };
        }
        self
    }

    /// Iceberg peak size, 0 for non-icebergs
    pub fn peak_size(&self) -> u64 {
        match self.kind {
            OrderKind::Iceberg { peak_size, .. } => peak_size,
            _ => 0,
        }
    }

    /// Hidden reserve, 0 for non-icebergs
    pub fn hidden_quantity(&self) -> u64 {
        match self.kind {
            OrderKind::Iceberg { hidden, .. } => hidden,
            _ => 0,
        }
    }

    /// Visible plus hidden remaining quantity
    pub fn total_quantity(&self) -> u64 {
        self.quantity + self.hidden_quantity()
    }

    /// Stop price of a stop-limit order
    pub fn stop_price(&self) -> Option<u64> {
        match self.kind {
            OrderKind::Stop { stop_price, .. } => Some(stop_price),
            _ => None,
        }
    }

    /// True for a stop-limit order still waiting for its trigger
    pub fn is_inactive_stop(&self) -> bool {
        matches!(
            self.kind,
            OrderKind::Stop { status: StopStatus::Inactive, .. }
        )
    }

    /// Whether `market_price` satisfies this order's stop condition.
    ///
    /// Buy stops trigger when the market trades at or above the stop price,
    /// sell stops when it trades at or below. Non-stop orders and a missing
    /// market price never trigger.
    pub fn stop_triggered(&self, market_price: Option<u64>) -> bool {
        match (self.stop_price(), market_price) {
            (Some(stop), Some(market)) => match self.side {
                Side::Buy => market >= stop,
                Side::Sell => market <= stop,
            },
            _ => false,
        }
    }

    /// Mark an inactive stop order as active.
    ///
    /// # Returns
    ///
    /// `true` if the order transitioned, `false` if it was not an inactive stop
    pub fn activate(&mut self) -> bool {
        match &mut self.kind {
            OrderKind::Stop { status, .. } if *status == StopStatus::Inactive => {
                *status = StopStatus::Active;
                true
            }
            _ => false,
        }
    }

    /// Check if the order has nothing left to trade
    pub fn is_filled(&self) -> bool {
        self.total_quantity() == 0
    }

    /// Fill a portion of the visible quantity
    ///
    /// # Returns
    ///
    /// The actual quantity filled (capped at the visible quantity)
    pub fn fill(&mut self, fill_qty: u64) -> u64 {
        let actual_fill = fill_qty.min(self.quantity);
        self.quantity -= actual_fill;
        actual_fill
    }

    /// Redistribute a new total remaining quantity between the visible
    /// and hidden parts. Icebergs show at most `peak_size`.
    pub fn set_total_quantity(&mut self, total: u64) {
        match &mut self.kind {
            OrderKind::Iceberg { peak_size, hidden } => {
                self.quantity = total.min(*peak_size);
                *hidden = total - self.quantity;
            }
            _ => self.quantity = total,
        }
    }

    /// Shrink the total remaining quantity without refilling the visible
    /// part. Icebergs give up hidden quantity first, so a partly consumed
    /// peak stays partly consumed.
    pub fn reduce_total_quantity(&mut self, total: u64) {
        debug_assert!(total <= self.total_quantity(), "reduction grows the order");
        match &mut self.kind {
            OrderKind::Iceberg { hidden, .. } => {
                self.quantity = self.quantity.min(total);
                *hidden = total - self.quantity;
            }
            _ => self.quantity = total,
        }
    }

    /// Move hidden reserve into the visible quantity once it is exhausted.
    ///
    /// # Returns
    ///
    /// `true` if the order was replenished
    pub fn replenish(&mut self) -> bool {
        if self.quantity > 0 {
            return false;
        }
        match &mut self.kind {
            OrderKind::Iceberg { peak_size, hidden } if *hidden > 0 => {
                let shown = (*peak_size).min(*hidden);
                *hidden -= shown;
                self.quantity = shown;
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
