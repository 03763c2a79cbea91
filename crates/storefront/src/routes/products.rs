//! Catalog API handlers.
//!
//! Uncached: every request filters the current catalog snapshot.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use tracing::instrument;

use techstore_core::catalog::find;
use techstore_core::{CatalogQuery, Product, ProductId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Filtered catalog listing.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub count: usize,
    pub products: Vec<Product>,
}

/// List products matching the query string.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<ProductList>> {
    let products = state.catalog().products().await?;
    let matched: Vec<Product> = query.apply(&products).into_iter().cloned().collect();

    Ok(Json(ProductList {
        count: matched.len(),
        products: matched,
    }))
}

/// Get a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let products = state.catalog().products().await?;
    find(&products, id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
