//! Core types for the Parfum cart.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod id;
pub mod line_item;
pub mod order;
pub mod price;
pub mod quantity;

pub use id::*;
pub use line_item::LineItem;
pub use order::Order;
pub use price::Price;
pub use quantity::Quantity;
