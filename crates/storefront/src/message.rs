//! Outbound order message and chat hand-off.
//!
//! The widget's responsibility ends at producing the [`Handoff`] pair: the
//! message text and the `wa.me` link that carries it. Opening the link is up
//! to the caller.

use std::fmt::Write;

use parfum_core::{LineItem, Price, sanitize_text};
use url::Url;

use crate::error::{CartError, Result};

/// Human-readable order summary.
///
/// ```text
/// Hello, I would like to place the following order:
///
/// 1. Oud Royal - 10ml (x2) - $200.00
///
/// Total: $200.00
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMessage {
    text: String,
}

impl OrderMessage {
    /// Build the summary for a list of cart lines.
    ///
    /// `greeting` opens the message followed by a blank line; an empty
    /// greeting is omitted.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`] if `items` is empty.
    pub fn from_items(greeting: &str, items: &[LineItem]) -> Result<Self> {
        if items.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let mut text = String::new();
        if !greeting.is_empty() {
            text.push_str(greeting);
            text.push_str("\n\n");
        }

        for (index, item) in items.iter().enumerate() {
            // Writing to a String cannot fail.
            let _ = writeln!(
                text,
                "{}. {} - {} (x{}) - {}",
                index + 1,
                sanitize_text(item.name()),
                sanitize_text(item.size()),
                item.quantity(),
                item.line_total(),
            );
        }

        let total: Price = items.iter().map(LineItem::line_total).sum();
        let _ = write!(text, "\nTotal: {total}");

        Ok(Self { text })
    }

    /// The plain message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The message percent-encoded for embedding in a URL.
    #[must_use]
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.text).into_owned()
    }
}

/// Message plus the destination link handed to the messaging app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    message: OrderMessage,
    url: Url,
}

impl Handoff {
    /// Build the chat link `<base>/<phone_number>?text=<encoded message>`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Destination`] if `base_url` is not a valid URL.
    pub fn new(base_url: &str, phone_number: &str, message: OrderMessage) -> Result<Self> {
        let mut url = Url::parse(base_url)?.join(phone_number)?;
        url.set_query(Some(&format!("text={}", message.encoded())));
        Ok(Self { message, url })
    }

    /// The order message.
    #[must_use]
    pub const fn message(&self) -> &OrderMessage {
        &self.message
    }

    /// The chat link to open.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parfum_core::{Quantity, validate_price};

    use super::*;

    fn line(name: &str, size: &str, price: &str, qty: u32) -> LineItem {
        LineItem::new(
            name,
            name,
            validate_price(price).unwrap(),
            size,
            Quantity::new(qty).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_single_line_message() {
        let message = OrderMessage::from_items("", &[line("A", "10ml", "100", 2)]).unwrap();
        assert!(message.text().contains("1. A - 10ml (x2) - $200.00\n"));
        assert!(message.text().ends_with("Total: $200.00"));
    }

    #[test]
    fn test_multi_line_message_with_greeting() {
        let message = OrderMessage::from_items(
            "Hola, me interesa realizar el siguiente pedido:",
            &[line("Oud", "5ml", "75.5", 1), line("Rose", "10ml", "120", 3)],
        )
        .unwrap();

        assert_eq!(
            message.text(),
            "Hola, me interesa realizar el siguiente pedido:\n\n\
             1. Oud - 5ml (x1) - $75.50\n\
             2. Rose - 10ml (x3) - $360.00\n\
             \nTotal: $435.50"
        );
    }

    #[test]
    fn test_message_keeps_text_sanitized() {
        let message = OrderMessage::from_items("", &[line("<b>X</b>", "5ml", "1", 1)]).unwrap();
        assert!(!message.text().contains("<b>"));
        assert!(message.text().contains("&#60;b&#62;X&#60;/b&#62;"));
    }

    #[test]
    fn test_empty_items_fail() {
        assert!(matches!(
            OrderMessage::from_items("Hi", &[]),
            Err(CartError::EmptyCart)
        ));
    }

    #[test]
    fn test_encoded_message() {
        let message = OrderMessage::from_items("", &[line("A", "10ml", "100", 2)]).unwrap();
        let encoded = message.encoded();
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('\n'));
        assert!(encoded.contains("%0A"));
        assert!(encoded.contains("%24200.00"));
    }

    #[test]
    fn test_handoff_url() {
        let message = OrderMessage::from_items("", &[line("A", "10ml", "100", 2)]).unwrap();
        let encoded = message.encoded();
        let handoff = Handoff::new("https://wa.me/", "524941125352", message).unwrap();

        assert_eq!(handoff.url().host_str(), Some("wa.me"));
        assert_eq!(handoff.url().path(), "/524941125352");
        assert_eq!(handoff.url().query(), Some(format!("text={encoded}").as_str()));
        assert!(handoff.message().text().contains("Total: $200.00"));
    }

    #[test]
    fn test_handoff_rejects_bad_base() {
        let message = OrderMessage::from_items("", &[line("A", "10ml", "100", 2)]).unwrap();
        assert!(matches!(
            Handoff::new("not a url", "1", message),
            Err(CartError::Destination(_))
        ));
    }
}
