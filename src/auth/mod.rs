//! Admin session guard.
//!
//! Admin routes require the bearer token issued by a live login. Password checks
//! use constant-time comparison to mitigate timing attacks.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::AppState;

/// Admin token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Middleware rejecting requests that do not carry a live admin token.
pub async fn admin_session_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return AppError::Unauthorized("Admin login required".to_string()).into_response();
    };

    match state.session.is_admin(&token).await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            AppError::Unauthorized("Admin session expired or invalid".to_string()).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Perform constant-time string comparison.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
