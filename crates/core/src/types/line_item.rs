//! Cart line item.

use serde::{Deserialize, Serialize};

use crate::types::{Price, Quantity};
use crate::validate::{ValidationError, is_sanitized, sanitize_text};

/// One (product, size, quantity) entry in the cart.
///
/// Text fields are sanitized on construction and must not be blank. A cart
/// holds at most one line per `(id, size)` pair; that invariant belongs to the
/// cart, not the line.
///
/// The persisted form is `{"id", "name", "price", "size", "quantity"}`.
/// Deserialization goes through [`LineItem::new`], so a record edited outside
/// the widget is re-sanitized and re-validated as it loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLineItem")]
pub struct LineItem {
    id: String,
    name: String,
    price: Price,
    size: String,
    quantity: Quantity,
}

#[derive(Deserialize)]
struct RawLineItem {
    id: String,
    name: String,
    price: Price,
    size: String,
    quantity: Quantity,
}

impl TryFrom<RawLineItem> for LineItem {
    type Error = ValidationError;

    fn try_from(raw: RawLineItem) -> Result<Self, Self::Error> {
        Self::new(&raw.id, &raw.name, raw.price, &raw.size, raw.quantity)
    }
}

impl LineItem {
    /// Create a line item, sanitizing `id`, `name` and `size`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Missing`] if any text field is blank.
    pub fn new(
        id: &str,
        name: &str,
        price: Price,
        size: &str,
        quantity: Quantity,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id: sanitize_required(id)?,
            name: sanitize_required(name)?,
            price,
            size: sanitize_required(size)?,
            quantity,
        })
    }

    /// Product identifier (sanitized).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name (sanitized).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Size label, e.g. `10ml` (sanitized).
    #[must_use]
    pub fn size(&self) -> &str {
        &self.size
    }

    /// Number of units.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Whether this line is for the given product and size.
    ///
    /// `id` and `size` are compared in sanitized form.
    #[must_use]
    pub fn matches(&self, id: &str, size: &str) -> bool {
        self.id == sanitize_text(id) && self.size == sanitize_text(size)
    }

    /// The same line with a different quantity.
    #[must_use]
    pub fn with_quantity(&self, quantity: Quantity) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Re-check the text invariants.
    ///
    /// Always true for lines built through [`LineItem::new`]; used as a guard
    /// before values reach rendering.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [&self.id, &self.name, &self.size]
            .iter()
            .all(|text| !text.trim().is_empty() && is_sanitized(text))
    }
}

fn sanitize_required(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing);
    }
    Ok(sanitize_text(trimmed))
}
