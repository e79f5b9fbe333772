//! Admin login endpoints.

use axum::{extract::State, http::HeaderMap, Json};

use super::{success, ApiResult};
use crate::auth::bearer_token;
use crate::models::{AdminLogin, AdminSessionInfo, LoginRequest};
use crate::AppState;

/// POST /api/session/login - Start a 24 hour admin session and issue its token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<AdminLogin> {
    success(
        state
            .session
            .login(&request.password, state.config.admin_password.as_deref())
            .await?,
    )
}

/// POST /api/session/logout - End the admin session of the presented token.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<AdminSessionInfo> {
    if let Some(token) = bearer_token(&headers) {
        state.session.logout(&token).await?;
    }
    success(AdminSessionInfo { logged_in: false })
}

/// GET /api/session - Report whether the presented token is a live admin session.
pub async fn session_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<AdminSessionInfo> {
    let logged_in = match bearer_token(&headers) {
        Some(token) => state.session.is_admin(&token).await?,
        None => false,
    };
    success(AdminSessionInfo { logged_in })
}
