//! Authentication extractor and session helpers for admin.
//!
//! There is a single admin account configured through the environment. A
//! successful login sets a flag in the server-side session; protected
//! handlers take [`RequireAdminAuth`] to insist on it.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::session_keys;

/// Extractor that requires admin authentication.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_admin: RequireAdminAuth) -> impl IntoResponse {
///     "only for the admin"
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdminAuth;

/// Rejection when the request has no authenticated admin session.
#[derive(Debug)]
pub struct AdminAuthRejection;

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "Unauthorized" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Session is set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection)?;

        if is_admin(session).await {
            Ok(Self)
        } else {
            Err(AdminAuthRejection)
        }
    }
}

/// Whether the session belongs to the logged-in admin.
pub async fn is_admin(session: &Session) -> bool {
    session
        .get::<bool>(session_keys::ADMIN_AUTHENTICATED)
        .await
        .ok()
        .flatten()
        .unwrap_or(false)
}

/// Mark the session as the admin's, under a fresh session ID.
///
/// # Errors
///
/// Returns error if the session store fails.
pub async fn mark_admin_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::ADMIN_AUTHENTICATED, true)
        .await
}

/// End the admin session.
///
/// # Errors
///
/// Returns error if the session store fails.
pub async fn clear_admin_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
