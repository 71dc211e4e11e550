//! Type-safe price representation using decimal arithmetic.

use std::fmt;
use std::iter::Sum;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::Quantity;
use crate::validate::ValidationError;

/// Significant digits a JSON number (an `f64`) carries through a save and
/// reload without change.
const STORED_DIGITS: u32 = 15;

/// A non-negative amount in the store's currency.
///
/// Persisted as a JSON number so records written by earlier versions of the
/// widget (plain numbers) load unchanged. Amounts are kept to
/// 15 significant digits, so the value in memory is exactly the value that
/// comes back from storage.
///
/// ```
/// use parfum_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(19_995, 3)).unwrap();
/// assert_eq!(price.to_string(), "$20.00");
/// assert!(Price::new(Decimal::NEGATIVE_ONE).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Exclusive upper bound for a unit price (10^13).
    #[must_use]
    pub fn max_amount() -> Decimal {
        Decimal::new(10_000_000_000_000, 0)
    }

    /// Create a new price, rounded half to even to 15 significant digits.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] if `amount` is negative or not
    /// below [`Price::max_amount`].
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        let amount = to_stored_precision(amount);
        let negative = amount.is_sign_negative() && !amount.is_zero();
        if negative || amount >= Self::max_amount() {
            return Err(ValidationError::OutOfRange {
                value: amount,
                min: Decimal::ZERO,
                max: Some(Self::max_amount()),
            });
        }
        Ok(Self(amount))
    }

    /// The raw decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(&self, quantity: Quantity) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity.get()))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// The amount rounded half away from zero to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.rounded())
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let total = iter.fold(Decimal::ZERO, |acc, price| {
            acc.checked_add(price.0).unwrap_or(Decimal::MAX)
        });
        Self(to_stored_precision(total))
    }
}

/// Round to [`STORED_DIGITS`] significant digits, never past the decimal
/// point. Integers below 2^53 already survive an `f64` unchanged.
fn to_stored_precision(amount: Decimal) -> Decimal {
    let amount = amount.normalize();
    let digits = amount
        .mantissa()
        .unsigned_abs()
        .checked_ilog10()
        .map_or(1, |log| log + 1);
    if digits <= STORED_DIGITS {
        return amount;
    }

    let scale = amount.scale().saturating_sub(digits - STORED_DIGITS);
    amount
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven)
        .normalize()
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
