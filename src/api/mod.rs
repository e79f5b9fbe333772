//! REST API module.
//!
//! Contains all API routes and handlers. Write endpoints report whether the change
//! reached the remote service or is held locally only.

mod admin;
mod cart;
mod connection;
mod images;
mod menu;
mod orders;

pub use admin::*;
pub use cart::*;
pub use connection::*;
pub use images::*;
pub use menu::*;
pub use orders::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::store::{SyncState, WriteOutcome};

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncState>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            sync: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a successful API response for a write, tagged with where it landed.
pub fn written<T: Serialize>(outcome: WriteOutcome<T>) -> ApiResult<T> {
    let sync = outcome.sync_state();
    Ok(ApiResponse {
        success: true,
        data: outcome.into_inner(),
        sync: Some(sync),
    })
}
