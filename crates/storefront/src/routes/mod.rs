//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness (database)
//!
//! # Pages (page cached, JSON)
//! GET  /                       - Home: sale products, brands, category counts
//! GET  /store                  - Full catalog
//! GET  /product/{id}           - Product with related products
//!
//! # Catalog API (uncached)
//! GET  /api/products           - Filtered and sorted catalog (query string)
//! GET  /api/products/{id}      - Single product
//!
//! # Cart (session-backed)
//! GET    /cart                 - Cart with totals
//! DELETE /cart                 - Clear cart
//! POST   /cart/add             - Add product
//! POST   /cart/increase        - +1
//! POST   /cart/decrease        - -1, removes at zero
//! POST   /cart/update          - Set quantity
//! POST   /cart/remove          - Remove line(s)
//! GET    /cart/count           - Item count
//!
//! # Checkout
//! POST /checkout               - WhatsApp order link, clears cart
//!
//! # Revalidation (x-admin-token)
//! POST   /api/revalidate       - Reload catalog, invalidate pages
//! GET    /api/revalidate       - Cache status
//! DELETE /api/revalidate       - Clear catalog cache
//! ```

pub mod cart;
pub mod checkout;
pub mod pages;
pub mod products;
pub mod revalidate;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/store", get(pages::store))
        .route("/product/{id}", get(pages::product))
}

/// Create the catalog API routes router.
pub fn product_api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/add", post(cart::add))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .nest("/api/products", product_api_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::submit))
        .route(
            "/api/revalidate",
            post(revalidate::trigger)
                .get(revalidate::status)
                .delete(revalidate::clear),
        )
}
