//! Admin session request and status bodies.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/session/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Issued on login. The token is sent back as `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLogin {
    pub token: String,
    /// Epoch milliseconds after which the token is refused
    pub expires_at: i64,
}

/// Whether the caller holds a live admin session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSessionInfo {
    pub logged_in: bool,
}
