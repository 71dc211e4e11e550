//! Checkout scenarios across cart, history and the WhatsApp hand-off.

#![allow(clippy::unwrap_used)]

use parfum_integration_tests::TestContext;
use parfum_storefront::{CartError, ErrorKind, UiEvent, WidgetOutcome};

// ============================================================================
// Checkout
// ============================================================================

#[test]
fn test_checkout_turns_cart_into_first_order() {
    let ctx = TestContext::new().unwrap();
    let mut widget = ctx.open_widget().unwrap();
    widget.add_to_cart("oud", "Oud Royal", "50", "10ml", "3").unwrap();
    assert_eq!(widget.summary().unwrap().total.to_string(), "$150.00");

    let checkout = widget.checkout().unwrap();

    assert_eq!(checkout.total.to_string(), "$150.00");
    assert!(widget.cart().is_empty());
    assert_eq!(widget.history().len(), 1);
    let order = widget.history().orders().first().unwrap();
    assert_eq!(order.id(), checkout.order_id);
    assert_eq!(order.total(), checkout.total);
    assert_eq!(order.items().len(), 1);
    assert_eq!(order.items().first().unwrap().name(), "Oud Royal");

    // Both records reflect the checkout after a reload
    let reopened = ctx.open_widget().unwrap();
    assert!(reopened.cart().is_empty());
    assert_eq!(reopened.history().orders(), widget.history().orders());
}

#[test]
fn test_checkout_message_and_link() {
    let ctx = TestContext::new().unwrap();
    let mut widget = ctx.open_widget().unwrap();
    widget.add_to_cart("a", "A", "100", "10ml", "2").unwrap();

    let checkout = widget.checkout().unwrap();
    let text = checkout.handoff.message().text();
    assert!(text.starts_with("Hello, I would like to place the following order:\n\n"));
    assert!(text.contains("1. A - 10ml (x2) - $200.00\n"));
    assert!(text.ends_with("\nTotal: $200.00"));

    let url = checkout.handoff.url().as_str();
    assert!(url.starts_with("https://wa.me/524941125352?text=Hello%2C%20I%20would"));
    assert!(url.ends_with("Total%3A%20%24200.00"));
}

#[test]
fn test_newest_order_first() {
    let ctx = TestContext::new().unwrap();
    let mut widget = ctx.open_widget().unwrap();

    widget.add_to_cart("a", "A", "10", "5ml", "1").unwrap();
    let first = widget.checkout().unwrap().order_id;
    widget.add_to_cart("b", "B", "20", "5ml", "1").unwrap();
    let second = widget.checkout().unwrap().order_id;

    assert!(second > first);
    let ids: Vec<_> = widget.history().orders().iter().map(|o| o.id()).collect();
    assert_eq!(ids, vec![second, first]);

    let html = widget.render_history().unwrap();
    let newer = html.find(&second.to_string()).unwrap();
    let older = html.find(&first.to_string()).unwrap();
    assert!(newer < older);
}

#[test]
fn test_checkout_empty_cart_changes_nothing() {
    let ctx = TestContext::new().unwrap();
    let mut widget = ctx.open_widget().unwrap();

    let err = widget.dispatch(UiEvent::Checkout).unwrap_err();
    assert!(matches!(err, CartError::EmptyCart));
    assert_eq!(err.user_message(), "Your cart is empty");
    assert!(widget.history().is_empty());
    assert!(!ctx.record_path(&ctx.config.history_key).exists());
}

// ============================================================================
// Quantity Ceiling
// ============================================================================

#[test]
fn test_merge_past_ceiling_leaves_cart_unchanged() {
    let ctx = TestContext::new().unwrap();
    let mut widget = ctx.open_widget().unwrap();
    widget.add_to_cart("oud", "Oud", "100", "10ml", "60").unwrap();

    let err = widget
        .add_to_cart("oud", "Oud", "100", "10ml", "40")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.user_message(), "The maximum quantity is 99");
    assert_eq!(widget.cart().item_count(), 60);

    let reopened = ctx.open_widget().unwrap();
    assert_eq!(reopened.cart().item_count(), 60);
}

#[test]
fn test_same_product_different_size_is_a_new_line() {
    let ctx = TestContext::new().unwrap();
    let mut widget = ctx.open_widget().unwrap();
    widget.add_to_cart("oud", "Oud", "100", "10ml", "2").unwrap();
    widget.add_to_cart("oud", "Oud", "300", "50ml", "1").unwrap();
    widget.add_to_cart("oud", "Oud", "100", "10ml", "1").unwrap();

    assert_eq!(widget.cart().len(), 2);
    assert_eq!(widget.cart().item_count(), 4);
    assert_eq!(widget.summary().unwrap().total.to_string(), "$600.00");
}

#[test]
fn test_events_from_page_script() {
    let ctx = TestContext::new().unwrap();
    let mut widget = ctx.open_widget().unwrap();

    let events: Vec<UiEvent> = serde_json::from_str(
        r#"[
            {"event":"add_to_cart","id":"rose","name":"Rose","price":"12.50","size":"5ml-rose","quantity":"4"},
            {"event":"update_quantity","index":0,"quantity":"2"},
            {"event":"checkout"}
        ]"#,
    )
    .unwrap();

    let outcomes: Vec<WidgetOutcome> = events
        .into_iter()
        .map(|event| widget.dispatch(event).unwrap())
        .collect();

    let Some(WidgetOutcome::CheckedOut(checkout)) = outcomes.last() else {
        panic!("expected checkout, got {outcomes:?}");
    };
    assert_eq!(checkout.total.to_string(), "$25.00");
    assert!(checkout.handoff.message().text().contains("Rose - 5ml (x2)"));

    widget.dispatch(UiEvent::ClearHistory).unwrap();
    assert!(ctx.open_widget().unwrap().history().is_empty());
}
