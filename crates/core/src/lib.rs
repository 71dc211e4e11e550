//! Parfum Core - Shared domain types and input validation.
//!
//! This crate provides the types used by the cart widget:
//! - `storefront` - Cart store, order history, rendering and checkout hand-off
//! - `integration-tests` - Scenario tests across crates
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no rendering. Every constructor validates its input, so a value of
//! one of these types is always within the documented bounds.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for prices, quantities, order IDs, line items and orders
//! - [`validate`] - Numeric validation and text sanitization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validate;

pub use types::*;
pub use validate::{
    ValidationError, sanitize_text, validate_integer, validate_number, validate_price,
    validate_quantity,
};
