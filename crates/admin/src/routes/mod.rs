//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness (database)
//!
//! # Auth (login rate limited)
//! POST /api/admin/login        - Email and password, sets the session flag
//! GET  /api/admin/login        - 405
//! POST /api/admin/logout       - Clear the session
//! GET  /api/admin/session      - Whether the caller is logged in
//!
//! # Products (admin session required)
//! GET    /api/products         - List
//! POST   /api/products         - Create (not published)
//! GET    /api/products/{id}    - Read
//! PUT    /api/products/{id}    - Update, publishes in the background
//! DELETE /api/products/{id}    - Delete with images, publishes in the background
//!
//! # Images (admin session required)
//! POST   /api/images           - Multipart upload, per-file results
//! DELETE /api/images/{name}    - Remove one blob
//!
//! # Publishing (admin session required)
//! POST /api/publish            - Revalidate the storefront
//! ```

pub mod auth;
pub mod images;
pub mod products;
pub mod publish;

use axum::Router;

use crate::state::AppState;

/// Create all routes for the admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(products::router())
        .merge(images::router())
        .merge(publish::router())
}
