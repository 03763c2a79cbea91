//! Checkout route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::CartStore;
use crate::services::checkout::{CheckoutOrder, DeliveryDetails, prepare_order};
use crate::state::AppState;

/// Turn the cart into a WhatsApp order link and empty the cart.
///
/// The cart is only cleared once the order has been composed, so a
/// validation error leaves it untouched.
#[instrument(skip(state, store, details))]
pub async fn submit(
    State(state): State<AppState>,
    mut store: CartStore,
    Json(details): Json<DeliveryDetails>,
) -> Result<Json<CheckoutOrder>> {
    let order = prepare_order(store.cart(), &details, &state.config().whatsapp_number)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    store.clear().await?;
    tracing::info!(
        item_count = order.item_count,
        total = %order.total,
        "Checkout composed"
    );

    Ok(Json(order))
}
