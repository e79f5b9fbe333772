//! Remote connection banner endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::ConnectionStatus;
use crate::AppState;

/// GET /api/connection - Last known remote reachability.
pub async fn connection_status(State(state): State<AppState>) -> ApiResult<ConnectionStatus> {
    success(*state.connection.read().await)
}

/// POST /api/connection/check - Check the remote service now.
pub async fn check_connection(State(state): State<AppState>) -> ApiResult<ConnectionStatus> {
    let status = state.store.check_connection().await;
    *state.connection.write().await = status;
    success(status)
}
