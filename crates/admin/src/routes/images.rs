//! Product image upload and removal.
//!
//! Each file in a multipart upload is checked and stored on its own; one bad
//! file is reported without stopping the rest.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{delete, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::services::storage::{check_image, generate_blob_name, is_valid_blob_name};
use crate::state::AppState;

/// Request body cap for an upload: ten maximum-size images plus framing.
const MAX_UPLOAD_BODY_BYTES: usize = 10 * crate::services::storage::MAX_IMAGE_BYTES + 64 * 1024;

/// A stored image.
#[derive(Debug, Serialize)]
pub struct UploadedImage {
    /// Name of the file as sent by the client.
    pub file_name: Option<String>,
    /// Blob name in the bucket.
    pub name: String,
    /// Public URL to store on the product.
    pub url: String,
}

/// A file that was not stored.
#[derive(Debug, Serialize)]
pub struct FailedImage {
    pub file_name: Option<String>,
    pub error: String,
}

/// Per-file upload results.
#[derive(Debug, Default, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedImage>,
    pub failures: Vec<FailedImage>,
}

/// Build the images router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/images",
            post(upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/api/images/{name}", delete(remove))
}

/// Upload images.
///
/// POST /api/images (multipart, any field name)
#[instrument(skip(_admin, state, multipart))]
async fn upload(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>> {
    let mut report = UploadReport::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?;

        if let Err(rejection) = check_image(content_type.as_deref(), data.len()) {
            tracing::warn!(file_name = ?file_name, %rejection, "Image rejected");
            report.failures.push(FailedImage {
                file_name,
                error: rejection.to_string(),
            });
            continue;
        }

        let content_type = content_type.unwrap_or_default();
        let name = generate_blob_name(file_name.as_deref(), &content_type);
        match state.storage().upload(&name, &content_type, data).await {
            Ok(url) => report.uploaded.push(UploadedImage {
                file_name,
                name,
                url: url.to_string(),
            }),
            Err(e) => {
                tracing::warn!(file_name = ?file_name, error = %e, "Image upload failed");
                report.failures.push(FailedImage {
                    file_name,
                    error: "upload failed".to_string(),
                });
            }
        }
    }

    if report.uploaded.is_empty() && report.failures.is_empty() {
        return Err(AppError::BadRequest("no files uploaded".to_string()));
    }

    Ok(Json(report))
}

/// Remove one image from the bucket.
///
/// DELETE /api/images/{name}
#[instrument(skip(_admin, state))]
async fn remove(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>> {
    if !is_valid_blob_name(&name) {
        return Err(AppError::BadRequest(format!("invalid image name: {name}")));
    }

    state.storage().delete(std::slice::from_ref(&name)).await?;
    Ok(Json(json!({ "success": true, "name": name })))
}
