//! Unified error handling for cart and order-history operations.
//!
//! Every failing operation returns a [`CartError`] and leaves the stores as
//! they were. Nothing here is fatal: callers surface
//! [`CartError::user_message`] to the shopper and carry on.

use thiserror::Error;

use parfum_core::{OrderId, Quantity, ValidationError};

use crate::storage::StorageError;

/// Error type for the storefront widget.
#[derive(Debug, Error)]
pub enum CartError {
    /// A numeric or text field failed validation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A required field was blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Adding to an existing line would exceed the per-line ceiling.
    #[error("Quantity limit exceeded: {current} in cart + {requested} requested > {max}")]
    QuantityLimit {
        /// Quantity already on the line.
        current: u32,
        /// Quantity the shopper tried to add.
        requested: u32,
        /// Per-line ceiling.
        max: u32,
    },

    /// A line index outside the cart.
    #[error("Line {index} is out of bounds (cart has {len} lines)")]
    OutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of lines in the cart.
        len: usize,
    },

    /// No order with this ID exists in the history.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Checkout or message building on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Persisting a record failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Encoding a record failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Rendering a template failed.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// The configured chat destination is not a valid URL.
    #[error("Invalid chat destination: {0}")]
    Destination(#[from] url::ParseError),
}

/// Broad class of a [`CartError`], used to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing input; shown to the shopper as a blocking alert.
    Validation,
    /// Invalid index or order ID on removal; logged, the operation is a no-op.
    Bounds,
    /// Nothing to check out.
    EmptyCart,
    /// Storage, encoding or rendering failure.
    Internal,
}

impl CartError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::MissingField(_) | Self::QuantityLimit { .. } => {
                ErrorKind::Validation
            }
            Self::OutOfBounds { .. } | Self::OrderNotFound(_) => ErrorKind::Bounds,
            Self::EmptyCart => ErrorKind::EmptyCart,
            Self::Storage(_) | Self::Serialize(_) | Self::Render(_) | Self::Destination(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Text suitable for an alert shown to the shopper.
    ///
    /// Internal details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "Please check the price and quantity".to_string(),
            Self::MissingField(field) => format!("Missing {field}"),
            Self::QuantityLimit { max, .. } => format!("The maximum quantity is {max}"),
            Self::OutOfBounds { .. } => "That item is no longer in your cart".to_string(),
            Self::OrderNotFound(_) => "That order no longer exists".to_string(),
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::Storage(_) | Self::Serialize(_) | Self::Render(_) | Self::Destination(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }

    pub(crate) const fn quantity_limit(current: Quantity, requested: Quantity) -> Self {
        Self::QuantityLimit {
            current: current.get(),
            requested: requested.get(),
            max: Quantity::MAX,
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
