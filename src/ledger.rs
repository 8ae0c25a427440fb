//! Open-order ledger.
//!
//! Maps order id to [`OrderState`]. Handlers only read it; the tracker is
//! the single writer and applies updated records through [`OrderLedger::apply`].

use ahash::AHashMap;

use crate::types::OrderState;

/// Working set of currently open orders.
///
/// Invariant: every stored record has `amount > 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderLedger {
    orders: AHashMap<u64, OrderState>,
}

impl OrderLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an open order.
    #[inline]
    pub fn get(&self, order_id: u64) -> Option<&OrderState> {
        self.orders.get(&order_id)
    }

    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.orders.contains_key(&order_id)
    }

    /// Store an updated record, or drop the order once it has no open shares.
    ///
    /// Returns the previously stored record, if any.
    #[inline]
    pub fn apply(&mut self, record: OrderState) -> Option<OrderState> {
        if record.is_open() {
            self.orders.insert(record.order_id, record)
        } else {
            self.orders.remove(&record.order_id)
        }
    }

    /// Number of open orders.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Iterate over open orders (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = &OrderState> {
        self.orders.values()
    }

    /// Total open shares across all orders.
    pub fn open_shares(&self) -> u64 {
        self.orders.values().map(|o| o.amount as u64).sum()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}

impl FromIterator<OrderState> for OrderLedger {
    fn from_iter<I: IntoIterator<Item = OrderState>>(iter: I) -> Self {
        let mut ledger = OrderLedger::new();
        for record in iter {
            ledger.apply(record);
        }
        ledger
    }
}
