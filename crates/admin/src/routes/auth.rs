//! Authentication route handlers for admin.
//!
//! A single account, configured through `ADMIN_EMAIL` and `ADMIN_PASSWORD`.
//! Login attempts are rate limited per client IP.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{auth_rate_limiter, clear_admin_session, is_admin, mark_admin_session};
use crate::state::AppState;

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login).get(login_method_not_allowed))
        .route_layer(auth_rate_limiter())
        .route("/api/admin/logout", post(logout))
        .route("/api/admin/session", get(session_status))
}

/// Check credentials and mark the session.
///
/// POST /api/admin/login
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>> {
    if !state
        .config()
        .credentials
        .matches(&request.email, &request.password)
    {
        tracing::warn!(email = %request.email, "Rejected admin login");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    mark_admin_session(&session).await?;
    tracing::info!("Admin logged in");

    Ok(Json(json!({ "success": true })))
}

/// GET /api/admin/login
async fn login_method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Use POST to login")
}

/// Logout and clear session.
///
/// POST /api/admin/logout
#[instrument(skip(session))]
async fn logout(session: Session) -> Result<Json<Value>> {
    clear_admin_session(&session).await?;
    Ok(Json(json!({ "success": true })))
}

/// Whether the caller is logged in.
///
/// GET /api/admin/session
async fn session_status(session: Session) -> Json<Value> {
    Json(json!({ "authenticated": is_admin(&session).await }))
}
