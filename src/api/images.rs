//! Image upload endpoint.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap},
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::store::ImageUpload;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub filename: String,
}

/// Reference to store in a menu item's `image_url`.
#[derive(Debug, Serialize)]
pub struct ImageReference {
    pub url: String,
}

/// POST /api/admin/images?filename=... - Upload an image, raw bytes in the body.
pub async fn upload_image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<ImageReference> {
    if body.is_empty() {
        return Err(AppError::Validation("Image file is empty".to_string()));
    }
    if query.filename.trim().is_empty() {
        return Err(AppError::Validation("File name is required".to_string()));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("image/"))
        .map(|v| v.to_string());

    let url = state
        .store
        .upload_image(ImageUpload {
            file_name: query.filename,
            content_type,
            bytes: body.to_vec(),
        })
        .await;

    success(ImageReference { url })
}
