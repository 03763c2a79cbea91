//! Revalidation endpoint, called by the admin when publishing.
//!
//! Every method requires the `x-admin-token` header to match the
//! configured revalidation token.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::revalidate::{RevalidateReport, RevalidateRequest, revalidate};
use crate::state::AppState;

/// Header carrying the shared revalidation token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if state.config().revalidate_token_matches(presented) {
        Ok(())
    } else {
        tracing::warn!("Rejected revalidation request with invalid token");
        Err(AppError::Unauthorized)
    }
}

/// Reload the catalog and invalidate cached pages.
///
/// The body is optional; an empty body revalidates the default paths.
#[instrument(skip(state, headers, body))]
pub async fn trigger(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RevalidateReport>> {
    authorize(&state, &headers)?;

    let request = if body.is_empty() {
        RevalidateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid revalidation request: {e}")))?
    };

    let report = revalidate(state.catalog(), state.pages(), &request).await?;
    Ok(Json(report))
}

/// Report the catalog cache state.
#[instrument(skip(state, headers))]
pub async fn status(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    authorize(&state, &headers)?;

    let update_method = if state.config().catalog_cache_ttl.is_some() {
        "ttl"
    } else {
        "manual-only"
    };

    Ok(Json(json!({
        "success": true,
        "cache": state.catalog().info().await,
        "update_method": update_method,
        "page_count": state.pages().entry_count(),
        "timestamp": Utc::now(),
    })))
}

/// Clear the catalog cache without reloading it.
#[instrument(skip(state, headers))]
pub async fn clear(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    authorize(&state, &headers)?;

    state.catalog().clear().await;

    Ok(Json(json!({
        "success": true,
        "message": "Catalog cache cleared, data will be fetched on next request",
        "timestamp": Utc::now(),
    })))
}
