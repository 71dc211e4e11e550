//! HTML fragments for the cart drawer, count badge and order history.
//!
//! View types hold display-ready strings; templates only lay them out. Name
//! and size are re-sanitized when a view is built and emitted with `|safe`, so
//! the template engine does not escape them a second time.

use askama::Template;
use parfum_core::{LineItem, Order, sanitize_text};

/// Format used for order dates on history cards.
const ORDER_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Cart line display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    /// Position in the cart; the key of the remove affordance.
    pub index: usize,
    pub name: String,
    pub size: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }

    /// Build the view for a list of cart lines.
    #[must_use]
    pub fn from_items(items: &[LineItem]) -> Self {
        if items.is_empty() {
            return Self::empty();
        }

        let total: parfum_core::Price = items.iter().map(LineItem::line_total).sum();
        Self {
            items: items
                .iter()
                .enumerate()
                .map(|(index, item)| CartItemView {
                    index,
                    name: sanitize_text(item.name()),
                    size: sanitize_text(item.size()),
                    quantity: item.quantity().get(),
                    price: item.price().to_string(),
                    line_price: item.line_total().to_string(),
                })
                .collect(),
            subtotal: total.to_string(),
            item_count: items.iter().map(|item| item.quantity().get()).sum(),
        }
    }
}

/// One line of an order card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineView {
    pub name: String,
    pub size: String,
    pub quantity: u32,
    pub line_price: String,
}

/// Order card display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    /// Order ID; the key of the delete affordance.
    pub id: i64,
    pub date: String,
    pub lines: Vec<OrderLineView>,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().as_i64(),
            date: order.date().format(ORDER_DATE_FORMAT).to_string(),
            lines: order
                .items()
                .iter()
                .map(|item| OrderLineView {
                    name: sanitize_text(item.name()),
                    size: sanitize_text(item.size()),
                    quantity: item.quantity().get(),
                    line_price: item.line_total().to_string(),
                })
                .collect(),
            total: order.total().to_string(),
        }
    }
}

/// Cart items fragment template.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Order history fragment template.
#[derive(Template)]
#[template(path = "orders/history.html")]
pub struct OrderHistoryTemplate {
    pub orders: Vec<OrderView>,
}

/// Render the cart drawer: item rows and running total, or the empty state.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_cart(items: &[LineItem]) -> askama::Result<String> {
    CartItemsTemplate {
        cart: CartView::from_items(items),
    }
    .render()
}

/// Render the cart count badge; hidden when the cart is empty.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_cart_badge(count: u32) -> askama::Result<String> {
    CartCountTemplate { count }.render()
}

/// Render the order history cards, newest first.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_history(orders: &[Order]) -> askama::Result<String> {
    OrderHistoryTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
    }
    .render()
}
