//! Line-item quantity.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// Number of units on a cart line, always within `[1, 99]`.
///
/// ## Examples
///
/// ```
/// use parfum_core::Quantity;
///
/// let two = Quantity::new(2).unwrap();
/// assert_eq!(two.checked_add(Quantity::new(3).unwrap()).unwrap().get(), 5);
///
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(100).is_err());
/// assert!(Quantity::new(98).unwrap().checked_add(two).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest quantity a line may hold.
    pub const MIN: u32 = 1;
    /// Largest quantity a line may hold.
    pub const MAX: u32 = 99;
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] outside `[1, 99]`.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::OutOfRange {
                value: Decimal::from(value),
                min: Decimal::from(Self::MIN),
                max: Some(Decimal::from(Self::MAX)),
            });
        }
        Ok(Self(value))
    }

    /// The number of units.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Add two quantities, re-checking the upper bound.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if the sum exceeds [`Self::MAX`].
    pub fn checked_add(self, other: Self) -> Result<Self, ValidationError> {
        Self::new(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}
