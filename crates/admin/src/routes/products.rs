//! Product CRUD handlers.
//!
//! Updates and deletes publish to the storefront in the background; new
//! products stay unpublished until `POST /api/publish`.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use tracing::instrument;

use techstore_core::{Product, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::models::ProductInput;
use crate::services::storage::blob_name_from_url;
use crate::services::{PublishAction, PublishRequest};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(index).post(create))
        .route("/api/products/{id}", get(show).put(update).delete(destroy))
}

/// List every product.
///
/// GET /api/products
#[instrument(skip(_admin, state))]
async fn index(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Create a product.
///
/// POST /api/products
#[instrument(skip(_admin, state, input))]
async fn create(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = input.validate()?;
    let created = ProductRepository::new(state.pool()).create(&product).await?;

    tracing::info!(product_id = %created.id, name = %created.name, "Product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get one product.
///
/// GET /api/products/{id}
#[instrument(skip(_admin, state))]
async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Replace a product and publish the change.
///
/// PUT /api/products/{id}
#[instrument(skip(_admin, state, input))]
async fn update(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let product = input.validate()?;
    let updated = ProductRepository::new(state.pool())
        .update(id, &product)
        .await?;

    tracing::info!(product_id = %id, "Product updated");
    state
        .publisher()
        .publish_in_background(PublishRequest::product(PublishAction::Update, id));

    Ok(Json(updated))
}

/// Delete a product, its stored images, and publish the change.
///
/// Image removal is best effort: a storage failure is logged and the row
/// is deleted anyway.
///
/// DELETE /api/products/{id}
#[instrument(skip(_admin, state))]
async fn destroy(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let repo = ProductRepository::new(state.pool());
    let pictures = repo
        .pictures(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let storage = state.storage();
    let blobs: Vec<String> = pictures
        .iter()
        .filter_map(|url| blob_name_from_url(url, storage.bucket()))
        .collect();

    let images_deleted = match storage.delete(&blobs).await {
        Ok(()) => blobs.len(),
        Err(e) => {
            tracing::warn!(error = %e, product_id = %id, count = blobs.len(), "Failed to delete product images");
            0
        }
    };

    repo.delete(id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    state
        .publisher()
        .publish_in_background(PublishRequest::product(PublishAction::Delete, id));

    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully",
        "images_deleted": images_deleted,
    })))
}
