//! Cart widget adapter.
//!
//! [`CartWidget`] owns the storage backend, the configuration and both
//! stores. UI code feeds it events and re-renders from its fragments; it never
//! touches the stores directly.

use std::fmt::{self, Display};
use std::time::Duration;

use parfum_core::{OrderId, Price, Quantity};
use serde::Deserialize;
use tracing::instrument;

use crate::cart::CartStore;
use crate::config::WidgetConfig;
use crate::error::{CartError, Result};
use crate::history::OrderHistoryStore;
use crate::message::Handoff;
use crate::presenter;
use crate::storage::Storage;

// =============================================================================
// Events and Outcomes
// =============================================================================

/// A shopper action, as delivered by the UI layer.
///
/// Deserializes from `{"event": "add_to_cart", ...}` so a page script can post
/// events as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UiEvent {
    /// "Add to cart" button. `size` is the raw size selector value.
    AddToCart {
        id: String,
        name: String,
        price: FieldValue,
        size: String,
        quantity: FieldValue,
    },
    /// Remove button on a cart line.
    RemoveLine { index: usize },
    /// Quantity change on a cart line.
    UpdateQuantity { index: usize, quantity: FieldValue },
    /// "Empty cart" button.
    ClearCart,
    /// "Send order" button.
    Checkout,
    /// Delete button on an order card.
    RemoveOrder { id: OrderId },
    /// "Clear history" button, after the shopper confirmed.
    ClearHistory,
}

/// A numeric form field as a page script sends it: input text or a number.
///
/// Either way it reaches the validators through its string form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The raw text of an input element.
    Text(String),
    /// A JSON number.
    Number(serde_json::Number),
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => Display::fmt(number, f),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Result of a dispatched [`UiEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOutcome {
    /// A product was added; show the notice.
    Added(Notice),
    /// The cart changed; re-render the cart and badge.
    CartChanged,
    /// An order was placed; open the hand-off link and re-render everything.
    CheckedOut(Checkout),
    /// The order history changed; re-render it.
    HistoryChanged,
}

/// Transient confirmation shown after adding to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Text of the notice, e.g. `✓ Product (x3) added to cart`.
    pub text: String,
    /// How long the notice stays on screen.
    pub lifetime: Duration,
}

impl Notice {
    fn added(quantity: Quantity, lifetime: Duration) -> Self {
        let text = if quantity.get() > 1 {
            format!("✓ Product (x{quantity}) added to cart")
        } else {
            "✓ Product added to cart".to_string()
        };
        Self { text, lifetime }
    }
}

/// A placed order and the link that sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// ID of the new order, now first in the history.
    pub order_id: OrderId,
    /// Cart total at checkout.
    pub total: Price,
    /// Message and chat link to open.
    pub handoff: Handoff,
}

/// Cart totals for the floating cart button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Units across all lines.
    pub item_count: u32,
    /// Sum of the line totals.
    pub total: Price,
    /// Whether the count badge is shown.
    pub badge_visible: bool,
}

// =============================================================================
// Widget
// =============================================================================

/// Cart and order-history state for one storefront page.
#[derive(Debug)]
pub struct CartWidget<S> {
    storage: S,
    config: WidgetConfig,
    cart: CartStore,
    history: OrderHistoryStore,
}

impl<S: Storage> CartWidget<S> {
    /// Restore the cart and order history from `storage`.
    ///
    /// Corrupted records are discarded and logged; opening never fails.
    pub fn open(mut storage: S, config: WidgetConfig) -> Self {
        let cart = CartStore::load(&mut storage, config.cart_key.clone());
        let history = OrderHistoryStore::load(&mut storage, config.history_key.clone());
        tracing::debug!(
            lines = cart.len(),
            orders = history.len(),
            "Cart widget opened"
        );

        Self {
            storage,
            config,
            cart,
            history,
        }
    }

    /// The cart store.
    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// The order history store.
    #[must_use]
    pub const fn history(&self) -> &OrderHistoryStore {
        &self.history
    }

    #[must_use]
    pub const fn config(&self) -> &WidgetConfig {
        &self.config
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Close the widget and hand back the storage backend.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Route a UI event to its handler.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler returns; see the individual methods.
    pub fn dispatch(&mut self, event: UiEvent) -> Result<WidgetOutcome> {
        match event {
            UiEvent::AddToCart {
                id,
                name,
                price,
                size,
                quantity,
            } => self
                .add_to_cart(&id, &name, price, parse_size_option(&size), quantity)
                .map(WidgetOutcome::Added),
            UiEvent::RemoveLine { index } => self
                .remove_line(index)
                .map(|()| WidgetOutcome::CartChanged),
            UiEvent::UpdateQuantity { index, quantity } => self
                .update_quantity(index, quantity)
                .map(|()| WidgetOutcome::CartChanged),
            UiEvent::ClearCart => self.clear_cart().map(|()| WidgetOutcome::CartChanged),
            UiEvent::Checkout => self.checkout().map(WidgetOutcome::CheckedOut),
            UiEvent::RemoveOrder { id } => self
                .remove_order(id)
                .map(|()| WidgetOutcome::HistoryChanged),
            UiEvent::ClearHistory => self
                .clear_history()
                .map(|()| WidgetOutcome::HistoryChanged),
        }
    }

    /// Add a product size to the cart.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add`].
    #[instrument(skip(self, price, quantity))]
    pub fn add_to_cart(
        &mut self,
        id: &str,
        name: &str,
        price: impl Display,
        size: &str,
        quantity: impl Display,
    ) -> Result<Notice> {
        let added = self
            .cart
            .add(&mut self.storage, id, name, price, size, quantity)?;
        Ok(Notice::added(added, self.config.notice_lifetime))
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// See [`CartStore::remove`].
    #[instrument(skip(self))]
    pub fn remove_line(&mut self, index: usize) -> Result<()> {
        self.cart.remove(&mut self.storage, index).map(|_| ())
    }

    /// Change the quantity of a cart line; `0` removes it.
    ///
    /// # Errors
    ///
    /// See [`CartStore::update_quantity`].
    #[instrument(skip(self, quantity))]
    pub fn update_quantity(&mut self, index: usize, quantity: impl Display) -> Result<()> {
        self.cart.update_quantity(&mut self.storage, index, quantity)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear(&mut self.storage)
    }

    /// Turn the cart into an order.
    ///
    /// Builds the message and chat link, records the order at the front of
    /// the history and empties the cart. If emptying the cart fails the order
    /// is taken back out of the history, so either both stores change or
    /// neither does.
    ///
    /// # Errors
    ///
    /// - [`CartError::EmptyCart`] if there is nothing to check out
    /// - [`CartError::Destination`] if the configured chat link is invalid
    /// - [`CartError::Storage`] if either store cannot be persisted
    #[instrument(skip(self))]
    pub fn checkout(&mut self) -> Result<Checkout> {
        self.cart.prune_invalid(&mut self.storage)?;
        if self.cart.is_empty() {
            tracing::warn!("Checkout with an empty cart");
            return Err(CartError::EmptyCart);
        }

        let message = self.cart.to_message(&self.config.greeting)?;
        let handoff = Handoff::new(
            &self.config.chat_base_url,
            &self.config.whatsapp_number,
            message,
        )?;
        let total = self.cart.total();

        let order_id = self
            .history
            .append(&mut self.storage, self.cart.items(), total)?;

        if let Err(e) = self.cart.clear(&mut self.storage) {
            if let Err(rollback) = self.history.remove(&mut self.storage, order_id) {
                tracing::error!(
                    order_id = %order_id,
                    error = %rollback,
                    "Failed to roll back order after cart clear failed"
                );
            }
            return Err(e);
        }

        tracing::info!(
            order_id = %order_id,
            total = %total,
            "Order placed"
        );

        Ok(Checkout {
            order_id,
            total,
            handoff,
        })
    }

    /// Delete one order from the history.
    ///
    /// # Errors
    ///
    /// See [`OrderHistoryStore::remove`].
    #[instrument(skip(self))]
    pub fn remove_order(&mut self, id: OrderId) -> Result<()> {
        self.history.remove(&mut self.storage, id).map(|_| ())
    }

    /// Delete every order.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the history cannot be persisted.
    #[instrument(skip(self))]
    pub fn clear_history(&mut self) -> Result<()> {
        self.history.clear_all(&mut self.storage)
    }

    /// Count and total for the cart button, after dropping invalid lines.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if dropped lines cannot be persisted.
    pub fn summary(&mut self) -> Result<CartSummary> {
        self.cart.prune_invalid(&mut self.storage)?;
        let item_count = self.cart.item_count();
        Ok(CartSummary {
            item_count,
            total: self.cart.total(),
            badge_visible: item_count > 0,
        })
    }

    /// Render the cart drawer, after dropping invalid lines.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if dropped lines cannot be persisted,
    /// or [`CartError::Render`] if the template fails.
    pub fn render_cart(&mut self) -> Result<String> {
        self.cart.prune_invalid(&mut self.storage)?;
        Ok(presenter::render_cart(self.cart.items())?)
    }

    /// Render the cart count badge.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Render`] if the template fails.
    pub fn render_cart_badge(&self) -> Result<String> {
        Ok(presenter::render_cart_badge(self.cart.item_count())?)
    }

    /// Render the order history.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Render`] if the template fails.
    pub fn render_history(&self) -> Result<String> {
        Ok(presenter::render_history(self.history.orders())?)
    }
}

// =============================================================================
// Input Helpers
// =============================================================================

/// Normalize the text of a quantity input.
///
/// Reads leading digits the way a browser's `parseInt` does; anything that is
/// not a number or is below 1 becomes 1, anything above 99 becomes 99.
#[must_use]
pub fn clamp_quantity_input(raw: &str) -> Quantity {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = rest.get(..end).unwrap_or_default();
    if negative || digits.is_empty() {
        return Quantity::ONE;
    }

    // Overlong digit strings are far above the ceiling anyway.
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    let clamped = value.clamp(u64::from(Quantity::MIN), u64::from(Quantity::MAX));
    u32::try_from(clamped)
        .ok()
        .and_then(|value| Quantity::new(value).ok())
        .unwrap_or(Quantity::ONE)
}

/// Extract the size from a size selector value of the form `<size>-<suffix>`.
#[must_use]
pub fn parse_size_option(value: &str) -> &str {
    value.split_once('-').map_or(value, |(size, _)| size)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    fn widget() -> CartWidget<MemoryStorage> {
        CartWidget::open(MemoryStorage::new(), WidgetConfig::default())
    }

    /// Storage that refuses writes to one key.
    #[derive(Debug, Default)]
    struct ReadOnlyKey {
        inner: MemoryStorage,
        locked: Option<String>,
    }

    impl Storage for ReadOnlyKey {
        fn get_item(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            if self.locked.as_deref() == Some(key) {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("read-only"),
                });
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> std::result::Result<(), StorageError> {
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn test_add_to_cart_notice() {
        let mut widget = widget();

        let notice = widget.add_to_cart("oud", "Oud", "100", "10ml", "1").unwrap();
        assert_eq!(notice.text, "✓ Product added to cart");
        assert_eq!(notice.lifetime, Duration::from_secs(2));

        let notice = widget.add_to_cart("oud", "Oud", "100", "10ml", "3").unwrap();
        assert_eq!(notice.text, "✓ Product (x3) added to cart");
        assert_eq!(widget.cart().item_count(), 4);
    }

    #[test]
    fn test_checkout_moves_cart_into_history() {
        let mut widget = widget();
        widget.add_to_cart("oud", "Oud", "50", "10ml", "3").unwrap();

        let checkout = widget.checkout().unwrap();
        assert_eq!(checkout.total.to_string(), "$150.00");
        assert!(widget.cart().is_empty());
        assert_eq!(widget.history().len(), 1);

        let order = &widget.history().orders()[0];
        assert_eq!(order.id(), checkout.order_id);
        assert_eq!(order.total(), checkout.total);
        assert_eq!(order.items()[0].name(), "Oud");

        let url = checkout.handoff.url().as_str();
        assert!(url.starts_with("https://wa.me/524941125352?text="));
        assert!(checkout.handoff.message().text().ends_with("Total: $150.00"));
    }

    #[test]
    fn test_checkout_empty_cart() {
        let mut widget = widget();
        assert!(matches!(widget.checkout(), Err(CartError::EmptyCart)));
        assert!(widget.history().is_empty());
    }

    #[test]
    fn test_checkout_rolls_back_when_cart_cannot_be_cleared() {
        let config = WidgetConfig::default();
        let mut widget = CartWidget::open(ReadOnlyKey::default(), config.clone());
        widget.add_to_cart("oud", "Oud", "50", "10ml", "1").unwrap();

        widget.storage.locked = Some(config.cart_key);
        assert!(matches!(widget.checkout(), Err(CartError::Storage(_))));
        assert_eq!(widget.cart().len(), 1);
        assert!(widget.history().is_empty());
    }

    #[test]
    fn test_dispatch() {
        let mut widget = widget();

        let event: UiEvent = serde_json::from_str(
            r#"{"event":"add_to_cart","id":"oud","name":"Oud","price":"80","size":"10ml-oud","quantity":"2"}"#,
        )
        .unwrap();
        assert!(matches!(
            widget.dispatch(event).unwrap(),
            WidgetOutcome::Added(_)
        ));
        assert_eq!(widget.cart().items()[0].size(), "10ml");

        let outcome = widget
            .dispatch(UiEvent::UpdateQuantity {
                index: 0,
                quantity: "5".into(),
            })
            .unwrap();
        assert_eq!(outcome, WidgetOutcome::CartChanged);
        assert_eq!(widget.cart().item_count(), 5);

        let WidgetOutcome::CheckedOut(checkout) = widget.dispatch(UiEvent::Checkout).unwrap()
        else {
            panic!("expected checkout");
        };
        assert_eq!(
            widget
                .dispatch(UiEvent::RemoveOrder {
                    id: checkout.order_id
                })
                .unwrap(),
            WidgetOutcome::HistoryChanged
        );
        assert!(widget.history().is_empty());
    }

    #[test]
    fn test_dispatch_accepts_numeric_fields() {
        let mut widget = widget();

        let event: UiEvent = serde_json::from_str(
            r#"{"event":"add_to_cart","id":"oud","name":"Oud","price":80,"size":"10ml","quantity":2}"#,
        )
        .unwrap();
        widget.dispatch(event).unwrap();
        assert_eq!(widget.cart().item_count(), 2);
        assert_eq!(widget.cart().total().to_string(), "$160.00");

        let event: UiEvent = serde_json::from_str(
            r#"{"event":"add_to_cart","id":"rose","name":"Rose","price":12.5,"size":"5ml","quantity":1}"#,
        )
        .unwrap();
        widget.dispatch(event).unwrap();
        assert_eq!(widget.cart().total().to_string(), "$172.50");

        let event: UiEvent =
            serde_json::from_str(r#"{"event":"update_quantity","index":0,"quantity":5}"#).unwrap();
        widget.dispatch(event).unwrap();
        assert_eq!(widget.cart().items()[0].quantity().get(), 5);

        let event: UiEvent = serde_json::from_str(
            r#"{"event":"update_quantity","index":1,"quantity":2.5}"#,
        )
        .unwrap();
        assert!(matches!(
            widget.dispatch(event),
            Err(CartError::Validation(_))
        ));
    }

    #[test]
    fn test_dispatch_reports_bounds_errors() {
        let mut widget = widget();
        let err = widget
            .dispatch(UiEvent::RemoveLine { index: 3 })
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Bounds);
    }

    #[test]
    fn test_summary_and_rendering() {
        let mut widget = widget();
        let summary = widget.summary().unwrap();
        assert_eq!(summary.item_count, 0);
        assert!(!summary.badge_visible);
        assert!(widget.render_cart().unwrap().contains("Your cart is empty"));
        assert!(widget.render_history().unwrap().contains("No orders yet"));

        widget.add_to_cart("oud", "Oud", "12.5", "5ml", "2").unwrap();
        let summary = widget.summary().unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total.to_string(), "$25.00");
        assert!(summary.badge_visible);
        assert!(widget.render_cart().unwrap().contains("$25.00"));
        assert!(!widget.render_cart_badge().unwrap().contains("hidden"));
    }

    #[test]
    fn test_reopen_restores_state() {
        let mut widget = widget();
        widget.add_to_cart("oud", "Oud", "100", "10ml", "2").unwrap();

        let reopened = CartWidget::open(widget.into_storage(), WidgetConfig::default());
        assert_eq!(reopened.cart().item_count(), 2);
    }

    #[test]
    fn test_clamp_quantity_input() {
        assert_eq!(clamp_quantity_input("5").get(), 5);
        assert_eq!(clamp_quantity_input(" 12abc").get(), 12);
        assert_eq!(clamp_quantity_input("").get(), 1);
        assert_eq!(clamp_quantity_input("abc").get(), 1);
        assert_eq!(clamp_quantity_input("0").get(), 1);
        assert_eq!(clamp_quantity_input("-4").get(), 1);
        assert_eq!(clamp_quantity_input("150").get(), 99);
        assert_eq!(clamp_quantity_input("99999999999999999999999").get(), 99);
        assert_eq!(clamp_quantity_input("7.9").get(), 7);
    }

    #[test]
    fn test_parse_size_option() {
        assert_eq!(parse_size_option("10ml-oud"), "10ml");
        assert_eq!(parse_size_option("100ml"), "100ml");
        assert_eq!(parse_size_option("5ml-a-b"), "5ml");
    }
}
