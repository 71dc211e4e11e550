//! Completed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LineItem, OrderId, Price};

/// Immutable snapshot of a checked-out cart.
///
/// Persisted as `{"id", "date", "items", "total"}` with `date` in ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    date: DateTime<Utc>,
    items: Vec<LineItem>,
    total: Price,
}

impl Order {
    /// Create an order from a copy of the cart's lines.
    #[must_use]
    pub fn new(id: OrderId, date: DateTime<Utc>, items: &[LineItem], total: Price) -> Self {
        Self {
            id,
            date,
            items: items.to_vec(),
            total,
        }
    }

    /// Order identifier.
    #[must_use]
    pub const fn id(&self) -> OrderId {
        self.id
    }

    /// When the order was placed.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Lines as they were at checkout.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Total recorded at checkout.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity().get()).sum()
    }
}
