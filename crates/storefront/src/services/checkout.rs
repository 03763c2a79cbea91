//! Checkout via WhatsApp.
//!
//! Orders are not stored. Checkout turns the cart and the delivery details
//! into a plain-text message and a `wa.me` link that opens a chat with the
//! shop with that message pre-filled.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use techstore_core::{Cart, format_price};

/// Greeting opening every order message.
const GREETING: &str = "السلام عليكم.";

/// Required phone prefix (Egyptian mobile numbers).
const PHONE_PREFIX: &str = "01";

/// Minimum phone length in characters.
const MIN_PHONE_LENGTH: usize = 11;

/// Reasons a checkout is refused. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty. Please add at least one product.")]
    EmptyCart,
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("Phone number must start with 01.")]
    PhonePrefix,
    #[error("Phone number must be at least 11 digits.")]
    PhoneTooShort,
}

/// Delivery fields submitted with an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeliveryDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl DeliveryDetails {
    /// Copy with surrounding whitespace removed.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

/// Validate an order before composing it.
///
/// # Errors
///
/// Returns the first failing [`CheckoutError`].
pub fn validate(cart: &Cart, details: &DeliveryDetails) -> Result<(), CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let details = details.trimmed();
    if details.name.is_empty() || details.phone.is_empty() || details.address.is_empty() {
        return Err(CheckoutError::MissingFields);
    }
    if !details.phone.starts_with(PHONE_PREFIX) {
        return Err(CheckoutError::PhonePrefix);
    }
    if details.phone.chars().count() < MIN_PHONE_LENGTH {
        return Err(CheckoutError::PhoneTooShort);
    }

    Ok(())
}

/// Render the order message.
#[must_use]
pub fn compose_message(cart: &Cart, details: &DeliveryDetails) -> String {
    let details = details.trimmed();
    let mut lines = vec![GREETING.to_string(), String::new(), "I want to order:".to_string()];

    for line in cart.lines() {
        lines.push(format!("• Model: {}", line.name));
        if let Some(brand) = &line.brand {
            lines.push(format!("• Brand: {brand}"));
        }
        if let Some(variant) = line.variant.label() {
            lines.push(format!("• Options: {variant}"));
        }
        lines.push(format!("• Quantity: {}", line.quantity));
        lines.push(format!("• Price: {}", format_price(line.effective_price)));
        lines.push(String::new());
    }

    lines.push(format!("Total: {}", format_price(cart.total())));
    let savings = cart.savings();
    if savings > Decimal::ZERO {
        lines.push(format!("You save: {}", format_price(savings)));
    }

    lines.extend([
        String::new(),
        "Delivery details:".to_string(),
        format!("• Name: {}", details.name),
        format!("• Phone: {}", details.phone),
        format!("• Address: {}", details.address),
        String::new(),
        "Please confirm availability.".to_string(),
    ]);

    lines.join("\n")
}

/// Build a `wa.me` deep link with `message` pre-filled.
#[must_use]
pub fn whatsapp_link(number: &str, message: &str) -> String {
    format!(
        "https://wa.me/{number}?text={}",
        urlencoding::encode(message)
    )
}

/// A composed order, ready to hand to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutOrder {
    pub whatsapp_url: String,
    pub message: String,
    pub item_count: u32,
    pub total: Decimal,
    pub savings: Decimal,
}

/// Validate and compose an order. Does not touch the cart.
///
/// # Errors
///
/// Returns the first failing [`CheckoutError`].
pub fn prepare_order(
    cart: &Cart,
    details: &DeliveryDetails,
    whatsapp_number: &str,
) -> Result<CheckoutOrder, CheckoutError> {
    validate(cart, details)?;
    let message = compose_message(cart, details);

    Ok(CheckoutOrder {
        whatsapp_url: whatsapp_link(whatsapp_number, &message),
        message,
        item_count: cart.count(),
        total: cart.total(),
        savings: cart.savings(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use techstore_core::{CartVariant, Product, ProductCategory, ProductId, ProductSpecs};

    use super::*;

    fn dress() -> Product {
        Product {
            id: ProductId::new(3),
            name: "Linen Dress".to_string(),
            brand: Some("Zara".to_string()),
            category: ProductCategory::Dress,
            price: Decimal::from(1000),
            discount_price: Some(Decimal::from(800)),
            stock: 5,
            is_available: true,
            description: String::new(),
            thumbnail: None,
            pictures: vec![],
            specs: ProductSpecs::default(),
            colors: vec!["red".to_string()],
            sizes: vec!["M".to_string()],
            rating: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        let variant = CartVariant::new(Some("red".to_string()), Some("M".to_string()));
        assert!(cart.add(&dress(), 2, variant));
        cart
    }

    fn details(phone: &str) -> DeliveryDetails {
        DeliveryDetails {
            name: "Mona".to_string(),
            phone: phone.to_string(),
            address: "12 Tahrir St, Cairo".to_string(),
        }
    }

    #[test]
    fn test_validation_order() {
        assert_eq!(
            validate(&Cart::new(), &DeliveryDetails::default()),
            Err(CheckoutError::EmptyCart)
        );
        assert_eq!(
            validate(&cart(), &DeliveryDetails { name: "  ".to_string(), ..details("01012345678") }),
            Err(CheckoutError::MissingFields)
        );
        assert_eq!(
            validate(&cart(), &details("02012345678")),
            Err(CheckoutError::PhonePrefix)
        );
        assert_eq!(
            validate(&cart(), &details("0101234")),
            Err(CheckoutError::PhoneTooShort)
        );
        assert_eq!(validate(&cart(), &details(" 01012345678 ")), Ok(()));
    }

    #[test]
    fn test_message_contents() {
        let message = compose_message(&cart(), &details("01012345678"));

        assert!(message.starts_with(GREETING));
        assert!(message.contains("• Model: Linen Dress"));
        assert!(message.contains("• Options: Color: red, Size: M"));
        assert!(message.contains("• Quantity: 2"));
        assert!(message.contains("• Price: 800 LE"));
        assert!(message.contains("Total: 1,600 LE"));
        assert!(message.contains("You save: 400 LE"));
        assert!(message.contains("• Phone: 01012345678"));
        assert!(message.ends_with("Please confirm availability."));
    }

    #[test]
    fn test_message_omits_savings_without_discount() {
        let mut product = dress();
        product.discount_price = None;
        let mut cart = Cart::new();
        cart.add(&product, 1, CartVariant::default());

        let message = compose_message(&cart, &details("01012345678"));
        assert!(!message.contains("You save"));
        assert!(!message.contains("Options"));
    }

    #[test]
    fn test_whatsapp_link_encodes_message() {
        let link = whatsapp_link("201001234567", "Hi there\n• Total: 5 LE");
        assert_eq!(
            link,
            "https://wa.me/201001234567?text=Hi%20there%0A%E2%80%A2%20Total%3A%205%20LE"
        );
    }

    #[test]
    fn test_prepare_order() {
        let order = prepare_order(&cart(), &details("01012345678"), "201001234567").unwrap();
        assert_eq!(order.item_count, 2);
        assert_eq!(order.total, Decimal::from(1600));
        assert_eq!(order.savings, Decimal::from(400));
        assert!(order.whatsapp_url.starts_with("https://wa.me/201001234567?text="));
    }
}
