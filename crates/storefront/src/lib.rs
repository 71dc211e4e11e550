//! Parfum storefront cart library.
//!
//! Headless cart and order-history state for the storefront widget: stores
//! persisted through a localStorage-like [`storage::Storage`], HTML fragments
//! rendered with askama, and the WhatsApp order hand-off.
//!
//! UI code drives everything through [`widget::CartWidget`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod history;
pub mod message;
pub mod presenter;
pub mod storage;
pub mod widget;

pub use cart::CartStore;
pub use config::{ConfigError, WidgetConfig};
pub use error::{CartError, ErrorKind, Result};
pub use history::OrderHistoryStore;
pub use message::{Handoff, OrderMessage};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use widget::{
    CartSummary, CartWidget, Checkout, FieldValue, Notice, UiEvent, WidgetOutcome, clamp_quantity_input,
    parse_size_option,
};
