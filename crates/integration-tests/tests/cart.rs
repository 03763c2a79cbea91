//! Cart behavior through the session-backed cart store.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use techstore_core::{Cart, CartVariant, ProductCategory, ProductId};
use techstore_integration_tests::{discounted, product, session};
use techstore_storefront::services::CartStore;
use techstore_storefront::services::cart::CART_KEY;

fn variant(color: &str, size: &str) -> CartVariant {
    CartVariant::new(Some(color.to_string()), Some(size.to_string()))
}

// =============================================================================
// Quantities and Stock
// =============================================================================

#[test]
fn test_add_clamps_to_stock() {
    let phone = product(1, "Galaxy S24", ProductCategory::Phone, 40_000);
    let mut cart = Cart::new();

    assert!(cart.add(&phone, 10, CartVariant::default()));
    assert_eq!(cart.count(), 5);

    // Topping up a full line is accepted but stays at stock
    assert!(cart.add(&phone, 1, CartVariant::default()));
    assert_eq!(cart.count(), 5);
    assert!(!cart.increase(phone.id, &CartVariant::default()));
}

#[test]
fn test_unavailable_and_zero_quantity_are_refused() {
    let mut sold_out = product(2, "iPhone 15", ProductCategory::Phone, 55_000);
    sold_out.stock = 0;
    let mut hidden = product(3, "Pixel 8", ProductCategory::Phone, 30_000);
    hidden.is_available = false;
    let phone = product(4, "Nothing Phone", ProductCategory::Phone, 20_000);

    let mut cart = Cart::new();
    assert!(!cart.add(&sold_out, 1, CartVariant::default()));
    assert!(!cart.add(&hidden, 1, CartVariant::default()));
    assert!(!cart.add(&phone, 0, CartVariant::default()));
    assert!(cart.is_empty());
}

#[test]
fn test_decreasing_last_unit_removes_line() {
    let laptop = product(1, "MacBook Air", ProductCategory::Laptop, 60_000);
    let mut cart = Cart::new();
    cart.add(&laptop, 2, CartVariant::default());

    cart.decrease(laptop.id, &CartVariant::default());
    assert_eq!(cart.count(), 1);
    cart.decrease(laptop.id, &CartVariant::default());
    assert!(cart.is_empty());
}

#[test]
fn test_set_quantity_zero_removes_and_large_clamps() {
    let laptop = product(1, "MacBook Air", ProductCategory::Laptop, 60_000);
    let mut cart = Cart::new();
    cart.add(&laptop, 1, CartVariant::default());

    cart.set_quantity(laptop.id, &CartVariant::default(), 99);
    assert_eq!(cart.count(), 5);

    cart.set_quantity(laptop.id, &CartVariant::default(), 0);
    assert!(!cart.contains(laptop.id));
}

// =============================================================================
// Prices
// =============================================================================

#[test]
fn test_discounted_line_totals() {
    let laptop = discounted(product(1, "ThinkPad X1", ProductCategory::Laptop, 1000), 800);
    let mut cart = Cart::new();
    cart.add(&laptop, 2, CartVariant::default());

    assert_eq!(cart.total(), Decimal::from(1600));
    assert_eq!(cart.subtotal(), Decimal::from(2000));
    assert_eq!(cart.savings(), Decimal::from(400));
}

#[test]
fn test_catalog_price_change_does_not_reprice_cart() {
    let before = discounted(product(1, "ThinkPad X1", ProductCategory::Laptop, 1000), 800);
    let mut cart = Cart::new();
    cart.add(&before, 1, CartVariant::default());

    let mut after = before.clone();
    after.price = Decimal::from(2000);
    after.discount_price = None;
    after.stock = 9;
    cart.add(&after, 6, CartVariant::default());

    let line = &cart.lines()[0];
    assert_eq!(line.effective_price, Decimal::from(800));
    assert_eq!(line.stock, 9);
    assert_eq!(line.quantity, 7);
    assert_eq!(cart.total(), Decimal::from(5600));
}

#[test]
fn test_total_is_sum_of_line_totals() {
    let phone = discounted(product(1, "Galaxy S24", ProductCategory::Phone, 42_999), 38_999);
    let dress = product(2, "Linen Dress", ProductCategory::Dress, 1_200);
    let tote = discounted(product(3, "Leather Tote", ProductCategory::Bag, 1_600), 1_350);

    let mut cart = Cart::new();
    cart.add(&phone, 1, CartVariant::default());
    cart.add(&dress, 2, variant("red", "M"));
    cart.add(&dress, 1, variant("blue", "L"));
    cart.add(&tote, 3, CartVariant::new(Some("brown".to_string()), None));

    let expected: Decimal = cart
        .lines()
        .iter()
        .map(|line| line.effective_price * Decimal::from(line.quantity))
        .sum();
    assert_eq!(cart.total(), expected);
    assert_eq!(cart.total(), Decimal::from(38_999 + 2 * 1_200 + 1_200 + 3 * 1_350));
    assert_eq!(cart.count(), 7);
}

// =============================================================================
// Variants
// =============================================================================

#[test]
fn test_variants_are_separate_lines() {
    let dress = product(5, "Linen Dress", ProductCategory::Dress, 1_200);
    let mut cart = Cart::new();
    cart.add(&dress, 1, variant("red", "M"));
    cart.add(&dress, 1, variant("red", "L"));
    cart.add(&dress, 1, variant("red", "M"));

    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.quantity_of(dress.id), 3);

    cart.remove(dress.id, Some(&variant("red", "L")));
    assert_eq!(cart.lines().len(), 1);

    cart.remove(dress.id, None);
    assert!(cart.is_empty());
}

#[test]
fn test_blank_variant_fields_are_unset() {
    assert_eq!(
        CartVariant::new(Some("  ".to_string()), Some(String::new())),
        CartVariant::default()
    );
}

// =============================================================================
// Session Persistence
// =============================================================================

#[tokio::test]
async fn test_cart_survives_reload() {
    let session = session();
    let laptop = discounted(product(1, "ThinkPad X1", ProductCategory::Laptop, 1000), 800);

    let mut store = CartStore::load(session.clone()).await.unwrap();
    store
        .update(|cart| cart.add(&laptop, 2, CartVariant::default()))
        .await
        .unwrap();

    let reloaded = CartStore::load(session).await.unwrap();
    assert_eq!(reloaded.cart().count(), 2);
    assert_eq!(reloaded.cart().total(), Decimal::from(1600));
    assert!(reloaded.cart().contains(ProductId::new(1)));
}

#[tokio::test]
async fn test_corrupt_stored_cart_starts_empty() {
    let session = session();
    session
        .insert_value(CART_KEY, serde_json::json!([{"product_id": "seven"}]))
        .await
        .unwrap();

    let store = CartStore::load(session.clone()).await.unwrap();
    assert!(store.cart().is_empty());
    assert!(session.get_value(CART_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_clear_empties_stored_cart() {
    let session = session();
    let phone = product(1, "Galaxy S24", ProductCategory::Phone, 40_000);

    let mut store = CartStore::load(session.clone()).await.unwrap();
    store
        .update(|cart| cart.add(&phone, 1, CartVariant::default()))
        .await
        .unwrap();
    store.clear().await.unwrap();

    let reloaded = CartStore::load(session).await.unwrap();
    assert!(reloaded.cart().is_empty());
}
