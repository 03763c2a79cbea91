//! Cart route handlers.
//!
//! The cart lives in the visitor's session (see [`CartStore`]). Every
//! mutating handler answers with the full updated cart so clients never
//! recompute totals themselves.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use techstore_core::catalog::find;
use techstore_core::{Cart, CartLine, CartVariant, ProductId};

use crate::error::{AppError, Result};
use crate::services::CartStore;
use crate::state::AppState;

/// Cart contents with computed totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub count: u32,
    pub subtotal: Decimal,
    pub savings: Decimal,
    pub total: Decimal,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            count: cart.count(),
            subtotal: cart.subtotal(),
            savings: cart.savings(),
            total: cart.total(),
        }
    }
}

/// Response to an add-to-cart request.
#[derive(Debug, Serialize)]
pub struct AddToCartResponse {
    /// `false` when the product is unavailable or out of stock.
    pub added: bool,
    pub cart: CartView,
}

/// Cart count badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub color: Option<String>,
    pub size: Option<String>,
}

/// Identifies one cart line.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl LineRequest {
    fn variant(&self) -> CartVariant {
        CartVariant::new(self.color.clone(), self.size.clone())
    }
}

/// Set-quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub color: Option<String>,
    pub size: Option<String>,
}

/// Display the cart.
#[instrument(skip(store))]
pub async fn show(store: CartStore) -> Json<CartView> {
    Json(CartView::from(store.cart()))
}

/// Cart item count.
#[instrument(skip(store))]
pub async fn count(store: CartStore) -> Json<CartCount> {
    Json(CartCount {
        count: store.cart().count(),
    })
}

/// Add a product to the cart.
///
/// The product is looked up in the current catalog so the line snapshots
/// today's price and stock.
#[instrument(skip(state, store))]
pub async fn add(
    State(state): State<AppState>,
    mut store: CartStore,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<AddToCartResponse>> {
    let products = state.catalog().products().await?;
    let product = find(&products, request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?;
    let variant = CartVariant::new(request.color, request.size);

    let added = store
        .update(|cart| cart.add(product, request.quantity, variant))
        .await?;

    Ok(Json(AddToCartResponse {
        added,
        cart: CartView::from(store.cart()),
    }))
}

/// Increase a line by one, up to its stock.
#[instrument(skip(store))]
pub async fn increase(
    mut store: CartStore,
    Json(request): Json<LineRequest>,
) -> Result<Json<CartView>> {
    let variant = request.variant();
    store
        .update(|cart| cart.increase(request.product_id, &variant))
        .await?;
    Ok(Json(CartView::from(store.cart())))
}

/// Decrease a line by one, removing it at zero.
#[instrument(skip(store))]
pub async fn decrease(
    mut store: CartStore,
    Json(request): Json<LineRequest>,
) -> Result<Json<CartView>> {
    let variant = request.variant();
    store
        .update(|cart| cart.decrease(request.product_id, &variant))
        .await?;
    Ok(Json(CartView::from(store.cart())))
}

/// Set a line's quantity. Zero removes the line.
#[instrument(skip(store))]
pub async fn update(
    mut store: CartStore,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let variant = CartVariant::new(request.color, request.size);
    store
        .update(|cart| cart.set_quantity(request.product_id, &variant, request.quantity))
        .await?;
    Ok(Json(CartView::from(store.cart())))
}

/// Remove a line. Without color or size, every line of the product goes.
#[instrument(skip(store))]
pub async fn remove(
    mut store: CartStore,
    Json(request): Json<LineRequest>,
) -> Result<Json<CartView>> {
    let variant = request.variant();
    let scope = (variant != CartVariant::default()).then_some(&variant);
    store
        .update(|cart| cart.remove(request.product_id, scope))
        .await?;
    Ok(Json(CartView::from(store.cart())))
}

/// Empty the cart.
#[instrument(skip(store))]
pub async fn clear(mut store: CartStore) -> Result<Json<CartView>> {
    store.clear().await?;
    Ok(Json(CartView::from(store.cart())))
}
