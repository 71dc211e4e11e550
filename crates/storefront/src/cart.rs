//! Cart store.
//!
//! Holds the shopper's line items in insertion order and mirrors them to a
//! single storage record. Every mutation builds the next list of lines,
//! persists it, and only then replaces the in-memory state, so a failed write
//! leaves the cart exactly as it was.

use std::fmt::Display;

use parfum_core::{
    LineItem, Price, Quantity, ValidationError, validate_integer, validate_price,
    validate_quantity,
};

use crate::error::{CartError, Result};
use crate::message::OrderMessage;
use crate::storage::{self, Record, Storage};

/// The shopper's cart.
///
/// Invariant: no two lines share an `(id, size)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStore {
    key: String,
    items: Vec<LineItem>,
}

impl CartStore {
    /// An empty cart persisted under `key`. Nothing is written until the
    /// first mutation.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            items: Vec::new(),
        }
    }

    /// Restore the cart persisted under `key`.
    ///
    /// Never fails. A record that is not a JSON array is removed and the cart
    /// starts empty. Otherwise each line is validated on its own; invalid
    /// lines and repeated `(id, size)` pairs are dropped and the cleaned cart
    /// is written back.
    pub fn load(storage: &mut dyn Storage, key: impl Into<String>) -> Self {
        let mut cart = Self::new(key);

        let entries = match storage::read_record(storage, &cart.key) {
            Record::Entries(entries) => entries,
            Record::Absent | Record::Corrupted => return cart,
        };

        let stored = entries.len();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<LineItem>(entry) {
                Ok(item) if cart.position(item.id(), item.size()).is_some() => {
                    tracing::warn!(
                        index,
                        id = item.id(),
                        size = item.size(),
                        "Dropping duplicate cart line"
                    );
                }
                Ok(item) => cart.items.push(item),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Dropping invalid cart line");
                }
            }
        }

        if cart.items.len() != stored {
            tracing::warn!(
                kept = cart.items.len(),
                dropped = stored - cart.items.len(),
                "Cart record cleaned on load"
            );
            if let Err(e) = storage::write_record(storage, &cart.key, &cart.items) {
                tracing::error!(error = %e, "Failed to persist cleaned cart");
            }
        }

        cart
    }

    /// Storage key of the cart record.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity().get()).sum()
    }

    /// Add `quantity` units of a product size.
    ///
    /// Text fields are sanitized; `price` must be a non-negative number and
    /// `quantity` a whole number in `[1, 99]`. If the cart already has a line
    /// for `(id, size)` the quantities are summed, and a sum above 99 rejects
    /// the whole operation.
    ///
    /// Returns the quantity that was added.
    ///
    /// # Errors
    ///
    /// - [`CartError::MissingField`] if a field is blank
    /// - [`CartError::Validation`] if price or quantity is invalid
    /// - [`CartError::QuantityLimit`] if the merged quantity exceeds 99
    /// - [`CartError::Storage`] if the cart cannot be persisted
    pub fn add(
        &mut self,
        storage: &mut dyn Storage,
        id: &str,
        name: &str,
        price: impl Display,
        size: &str,
        quantity: impl Display,
    ) -> Result<Quantity> {
        let price = validate_price(price).map_err(|e| missing_as_field(e, "price"))?;
        let quantity = validate_quantity(quantity).map_err(|e| missing_as_field(e, "quantity"))?;
        let line = LineItem::new(id, name, price, size, quantity).map_err(|_| {
            CartError::MissingField(blank_text_field(id, name, size))
        })?;

        let mut next = self.items.clone();
        let existing = next
            .iter_mut()
            .find(|item| item.id() == line.id() && item.size() == line.size());
        match existing {
            Some(existing) => {
                let merged = existing
                    .quantity()
                    .checked_add(quantity)
                    .map_err(|_| CartError::quantity_limit(existing.quantity(), quantity))?;
                *existing = existing.with_quantity(merged);
            }
            None => next.push(line),
        }

        self.commit(storage, next)?;
        Ok(quantity)
    }

    /// Remove the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfBounds`] without touching the cart if
    /// `index` is not a valid line, or [`CartError::Storage`] if the cart
    /// cannot be persisted.
    pub fn remove(&mut self, storage: &mut dyn Storage, index: usize) -> Result<LineItem> {
        self.check_index(index)?;
        let mut next = self.items.clone();
        let removed = next.remove(index);
        self.commit(storage, next)?;
        Ok(removed)
    }

    /// Set the quantity of the line at `index`.
    ///
    /// A quantity of `0` removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfBounds`] if `index` is not a valid line
    /// - [`CartError::Validation`] if `quantity` is not a whole number in `[0, 99]`
    /// - [`CartError::Storage`] if the cart cannot be persisted
    pub fn update_quantity(
        &mut self,
        storage: &mut dyn Storage,
        index: usize,
        quantity: impl Display,
    ) -> Result<()> {
        self.check_index(index)?;
        let requested = validate_integer(quantity, 0, i64::from(Quantity::MAX))
            .map_err(|e| missing_as_field(e, "quantity"))?;

        if requested == 0 {
            self.remove(storage, index)?;
            return Ok(());
        }

        let quantity = validate_quantity(requested)?;
        let mut next = self.items.clone();
        if let Some(line) = next.get_mut(index) {
            *line = line.with_quantity(quantity);
        }
        self.commit(storage, next)
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the cart cannot be persisted.
    pub fn clear(&mut self, storage: &mut dyn Storage) -> Result<()> {
        self.commit(storage, Vec::new())
    }

    /// Drop lines that no longer pass validation.
    ///
    /// Returns how many lines were dropped. The cart is persisted only when
    /// something changed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the cleaned cart cannot be persisted.
    pub fn prune_invalid(&mut self, storage: &mut dyn Storage) -> Result<usize> {
        let next: Vec<LineItem> = self
            .items
            .iter()
            .filter(|item| item.is_valid())
            .cloned()
            .collect();
        let dropped = self.items.len() - next.len();
        if dropped > 0 {
            tracing::warn!(dropped, "Dropping cart lines that failed revalidation");
            self.commit(storage, next)?;
        }
        Ok(dropped)
    }

    /// Build the order summary for the current lines.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`] if the cart has no lines.
    pub fn to_message(&self, greeting: &str) -> Result<OrderMessage> {
        OrderMessage::from_items(greeting, &self.items)
    }

    fn position(&self, id: &str, size: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.id() == id && item.size() == size)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            tracing::warn!(index, len = self.items.len(), "Cart line index out of bounds");
            return Err(CartError::OutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    fn commit(&mut self, storage: &mut dyn Storage, next: Vec<LineItem>) -> Result<()> {
        storage::write_record(storage, &self.key, &next)?;
        self.items = next;
        Ok(())
    }
}

fn missing_as_field(error: ValidationError, field: &'static str) -> CartError {
    match error {
        ValidationError::Missing => CartError::MissingField(field),
        other => CartError::Validation(other),
    }
}

fn blank_text_field(id: &str, name: &str, size: &str) -> &'static str {
    [("id", id), ("name", name), ("size", size)]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map_or("id", |(field, _)| field)
}
