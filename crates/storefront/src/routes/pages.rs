//! Catalog page handlers.
//!
//! Pages are JSON payloads built from the catalog snapshot and kept in the
//! page cache until a revalidation drops them. Responses carry an `x-cache`
//! header (`hit` or `miss`).

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::{HeaderName, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use techstore_core::catalog::{brands, category_counts, find, related_products, sale_products};
use techstore_core::{Product, ProductCategory, ProductId};

use crate::cache::{CachedPage, TAG_CATEGORIES, TAG_PRODUCTS};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Products shown in the home page sale strip.
const HOME_SALE_LIMIT: usize = 4;

/// Related products shown on a product page.
const RELATED_LIMIT: usize = 8;

#[derive(Serialize)]
struct HomePage<'a> {
    sale_products: Vec<&'a Product>,
    brands: Vec<&'a str>,
    categories: BTreeMap<ProductCategory, usize>,
    product_count: usize,
}

#[derive(Serialize)]
struct StorePage<'a> {
    products: &'a [Product],
    brands: Vec<&'a str>,
    categories: BTreeMap<ProductCategory, usize>,
}

#[derive(Serialize)]
struct ProductPage<'a> {
    product: &'a Product,
    related: Vec<&'a Product>,
}

/// Home page: sale products, brands and category counts.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<Response> {
    serve_cached(&state, "/", |products| {
        let page = HomePage {
            sale_products: sale_products(products, HOME_SALE_LIMIT),
            brands: brands(products),
            categories: category_counts(products),
            product_count: products.len(),
        };
        render(&page, &[TAG_PRODUCTS, TAG_CATEGORIES])
    })
    .await
}

/// Store page: the full catalog.
#[instrument(skip(state))]
pub async fn store(State(state): State<AppState>) -> Result<Response> {
    serve_cached(&state, "/store", |products| {
        let page = StorePage {
            products,
            brands: brands(products),
            categories: category_counts(products),
        };
        render(&page, &[TAG_PRODUCTS, TAG_CATEGORIES])
    })
    .await
}

/// Product page: one product and related products from the same category.
#[instrument(skip(state))]
pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let path = format!("/product/{id}");
    serve_cached(&state, &path, |products| {
        let product =
            find(products, id).ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
        let page = ProductPage {
            product,
            related: related_products(products, product, RELATED_LIMIT),
        };
        render(&page, &[TAG_PRODUCTS])
    })
    .await
}

/// Serve `path` from the page cache, building and storing it on a miss.
///
/// Failed builds are not cached.
async fn serve_cached<F>(state: &AppState, path: &str, build: F) -> Result<Response>
where
    F: FnOnce(&[Product]) -> Result<CachedPage>,
{
    if let Some(page) = state.pages().get(path).await {
        tracing::debug!(path, "Page cache hit");
        return Ok(page_response(&page, "hit"));
    }

    let products = state.catalog().products().await?;
    let page = build(&products)?;
    state.pages().insert(path, page.clone()).await;
    tracing::debug!(path, "Page cache miss, rendered");

    Ok(page_response(&page, "miss"))
}

fn render<T: Serialize>(payload: &T, tags: &[&'static str]) -> Result<CachedPage> {
    CachedPage::render(payload, tags).map_err(|e| AppError::Internal(format!("render failed: {e}")))
}

fn page_response(page: &CachedPage, cache_status: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (HeaderName::from_static("x-cache"), cache_status),
        ],
        page.body.to_string(),
    )
        .into_response()
}
