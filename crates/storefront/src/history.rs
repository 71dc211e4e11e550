//! Order history store.
//!
//! Completed orders, newest first, mirrored to one storage record. Orders are
//! only ever created by checkout and never modified afterwards; they can be
//! removed one at a time or all at once.

use chrono::{DateTime, Utc};
use parfum_core::{LineItem, Order, OrderId, Price};

use crate::error::{CartError, Result};
use crate::storage::{self, Record, Storage};

/// Completed orders, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHistoryStore {
    key: String,
    orders: Vec<Order>,
}

impl OrderHistoryStore {
    /// An empty history persisted under `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            orders: Vec::new(),
        }
    }

    /// Restore the history persisted under `key`.
    ///
    /// Never fails. A record that is not a JSON array is removed and the
    /// history starts empty; orders that fail validation and later orders
    /// repeating an earlier ID are dropped, and the cleaned history is
    /// written back.
    pub fn load(storage: &mut dyn Storage, key: impl Into<String>) -> Self {
        let mut history = Self::new(key);

        let entries = match storage::read_record(storage, &history.key) {
            Record::Entries(entries) => entries,
            Record::Absent | Record::Corrupted => return history,
        };

        let stored = entries.len();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Order>(entry) {
                Ok(order) if history.get(order.id()).is_some() => {
                    tracing::warn!(index, order_id = %order.id(), "Dropping duplicate order");
                }
                Ok(order) => history.orders.push(order),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Dropping invalid order");
                }
            }
        }

        if history.orders.len() != stored {
            if let Err(e) = storage::write_record(storage, &history.key, &history.orders) {
                tracing::error!(error = %e, "Failed to persist cleaned order history");
            }
        }

        history
    }

    /// Orders, newest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Look up an order.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id() == id)
    }

    /// Number of orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether there are no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Record a checkout of `items` with the given total, timestamped now.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the history cannot be persisted.
    pub fn append(
        &mut self,
        storage: &mut dyn Storage,
        items: &[LineItem],
        total: Price,
    ) -> Result<OrderId> {
        self.append_at(storage, items, total, Utc::now())
    }

    /// Record a checkout placed at `placed_at`.
    ///
    /// The new order goes to the front. Its ID is the timestamp in
    /// milliseconds, bumped past the largest existing ID when two checkouts
    /// land in the same millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the history cannot be persisted.
    pub fn append_at(
        &mut self,
        storage: &mut dyn Storage,
        items: &[LineItem],
        total: Price,
        placed_at: DateTime<Utc>,
    ) -> Result<OrderId> {
        let mut id = OrderId::from_timestamp(placed_at);
        let latest = self.orders.iter().map(Order::id).max();
        if let Some(latest) = latest.filter(|latest| id <= *latest) {
            id = latest.next();
        }

        let mut next = Vec::with_capacity(self.orders.len() + 1);
        next.push(Order::new(id, placed_at, items, total));
        next.extend(self.orders.iter().cloned());

        self.commit(storage, next)?;
        Ok(id)
    }

    /// Remove one order.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OrderNotFound`] without touching the history if
    /// no order has this ID, or [`CartError::Storage`] if the history cannot
    /// be persisted.
    pub fn remove(&mut self, storage: &mut dyn Storage, id: OrderId) -> Result<Order> {
        let Some(removed) = self.get(id).cloned() else {
            tracing::warn!(order_id = %id, "Order not found");
            return Err(CartError::OrderNotFound(id));
        };

        let next = self
            .orders
            .iter()
            .filter(|order| order.id() != id)
            .cloned()
            .collect();
        self.commit(storage, next)?;
        Ok(removed)
    }

    /// Remove every order. Callers confirm with the shopper first.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the history cannot be persisted.
    pub fn clear_all(&mut self, storage: &mut dyn Storage) -> Result<()> {
        self.commit(storage, Vec::new())
    }

    fn commit(&mut self, storage: &mut dyn Storage, next: Vec<Order>) -> Result<()> {
        storage::write_record(storage, &self.key, &next)?;
        self.orders = next;
        Ok(())
    }
}
