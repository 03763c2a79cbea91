//! Shopping cart with price snapshots.
//!
//! A cart is an ordered list of lines keyed by product identity plus the
//! chosen variant. Each line snapshots the product's prices when it is first
//! added: later catalog price changes never alter a line already in the cart.
//!
//! Stock is enforced by clamping. Requests for more units than are in stock
//! are silently reduced; a `tracing` warning is the only signal.
//!
//! The cart itself does no I/O. Callers persist the whole collection after
//! every mutation (see the storefront's session-backed cart store).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{Product, ProductCategory, ProductId};

/// The variant a customer picked for a line.
///
/// Products without options use the default (no color, no size).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartVariant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartVariant {
    /// Build a variant, treating blank strings as "not chosen".
    #[must_use]
    pub fn new(color: Option<String>, size: Option<String>) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            color: clean(color),
            size: clean(size),
        }
    }

    /// Human-readable label such as `Color: red, Size: M`.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let parts: Vec<String> = [("Color", &self.color), ("Size", &self.size)]
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}: {v}")))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant: CartVariant,
    pub name: String,
    pub brand: Option<String>,
    pub category: ProductCategory,
    pub thumbnail: Option<String>,
    /// Base price at add time.
    pub price: Decimal,
    /// Discount price at add time.
    pub discount_price: Option<Decimal>,
    /// Price charged per unit, resolved once at add time.
    pub effective_price: Decimal,
    /// Units in stock when the line was last topped up.
    pub stock: u32,
    pub quantity: u32,
}

impl CartLine {
    fn snapshot(product: &Product, variant: CartVariant, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            variant,
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category,
            thumbnail: product.display_image().map(str::to_string),
            price: product.price,
            discount_price: product.discount_price,
            effective_price: product.effective_price(),
            stock: product.stock_units(),
            quantity,
        }
    }

    fn matches(&self, product_id: ProductId, variant: &CartVariant) -> bool {
        self.product_id == product_id && &self.variant == variant
    }

    /// `effective_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_price * Decimal::from(self.quantity)
    }

    /// `price * quantity`, before any discount.
    #[must_use]
    pub fn line_subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    /// Amount saved on this line by its discount, zero when there is none.
    #[must_use]
    pub fn line_savings(&self) -> Decimal {
        match self.discount_price {
            Some(discount) if discount > Decimal::ZERO && discount < self.price => {
                (self.price - discount) * Decimal::from(self.quantity)
            }
            _ => Decimal::ZERO,
        }
    }
}

/// A customer's cart.
///
/// Serializes as a plain JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `quantity` units of a product in the given variant.
    ///
    /// Returns `false` when the product is unavailable, out of stock, or the
    /// quantity is zero. Otherwise returns `true`, even if the requested
    /// quantity had to be clamped to the available stock.
    pub fn add(&mut self, product: &Product, quantity: u32, variant: CartVariant) -> bool {
        if !product.in_stock() {
            warn!(product_id = %product.id, "product is not available or out of stock");
            return false;
        }
        if quantity == 0 {
            warn!(product_id = %product.id, "refusing to add zero units");
            return false;
        }

        let stock = product.stock_units();

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.matches(product.id, &variant))
        {
            let requested = line.quantity.saturating_add(quantity);
            if requested > stock {
                warn!(
                    product_id = %product.id,
                    requested,
                    stock,
                    "cannot add more than available stock"
                );
            }
            line.quantity = requested.min(stock);
            line.stock = stock;
            return true;
        }

        if quantity > stock {
            warn!(
                product_id = %product.id,
                requested = quantity,
                stock,
                "cannot add more than available stock"
            );
        }
        self.lines
            .push(CartLine::snapshot(product, variant, quantity.min(stock)));
        true
    }

    /// Remove lines for a product.
    ///
    /// With a variant, only that line is removed; without one, every variant
    /// of the product is removed.
    pub fn remove(&mut self, product_id: ProductId, variant: Option<&CartVariant>) {
        self.lines.retain(|line| match variant {
            Some(variant) => !line.matches(product_id, variant),
            None => line.product_id != product_id,
        });
    }

    /// Add one unit to a line, refusing to exceed the snapshotted stock.
    ///
    /// Returns `true` if the quantity changed.
    pub fn increase(&mut self, product_id: ProductId, variant: &CartVariant) -> bool {
        let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.matches(product_id, variant))
        else {
            return false;
        };

        if line.quantity >= line.stock {
            warn!(product_id = %product_id, stock = line.stock, "cannot exceed available stock");
            return false;
        }
        line.quantity += 1;
        true
    }

    /// Remove one unit from a line; the line disappears when it reaches zero.
    pub fn decrease(&mut self, product_id: ProductId, variant: &CartVariant) {
        for line in &mut self.lines {
            if line.matches(product_id, variant) {
                line.quantity = line.quantity.saturating_sub(1);
            }
        }
        self.lines.retain(|line| line.quantity > 0);
    }

    /// Set a line's quantity directly.
    ///
    /// A quantity below one removes the line; anything above the
    /// snapshotted stock is clamped to it.
    pub fn set_quantity(&mut self, product_id: ProductId, variant: &CartVariant, quantity: u32) {
        if quantity < 1 {
            self.remove(product_id, Some(variant));
            return;
        }

        for line in &mut self.lines {
            if line.matches(product_id, variant) {
                line.quantity = quantity.min(line.stock);
            }
        }
        self.lines.retain(|line| line.quantity > 0);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// All lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Amount to pay: sum of `effective_price * quantity`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Amount before discounts: sum of `price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_subtotal).sum()
    }

    /// Total saved through discounts.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_savings).sum()
    }

    /// Units of a product in the cart, across all variants.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.product_id == product_id)
            .map(|line| line.quantity)
            .sum()
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.lines.iter().any(|line| line.product_id == product_id)
    }
}
