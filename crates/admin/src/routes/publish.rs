//! Manual publish to the storefront.

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::services::PublishRequest;
use crate::state::AppState;

/// Build the publish router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/publish", post(publish))
}

/// Forward a revalidation request to the storefront and wait for its report.
///
/// An empty body publishes the whole catalog.
///
/// POST /api/publish
#[instrument(skip(_admin, state, body))]
async fn publish(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>> {
    let request = if body.is_empty() {
        PublishRequest::full()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("invalid publish request: {e}")))?
    };

    let report = state.publisher().publish(&request).await?;
    Ok(Json(json!({ "success": true, "storefront": report })))
}
