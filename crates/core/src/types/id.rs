//! Newtype IDs for type-safe entity references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a completed order.
///
/// Derived from the order's creation time in milliseconds since the Unix
/// epoch. Two checkouts in the same millisecond would produce the same raw
/// value, so the order history bumps colliding IDs past its newest entry.
///
/// # Example
///
/// ```rust
/// # use parfum_core::OrderId;
/// let id = OrderId::new(1_700_000_000_000);
/// assert_eq!(id.as_i64(), 1_700_000_000_000);
/// assert_eq!(id.next().as_i64(), 1_700_000_000_001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Create a new ID from an i64 value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Create an ID from a creation timestamp.
    #[must_use]
    pub const fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis())
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// The ID immediately after this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl ::core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for i64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}
