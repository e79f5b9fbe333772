//! Per-client session context: carts and admin logins.
//!
//! Both live in local storage only and never reach the remote service. A cart is
//! keyed by the id the client sends with each request, an admin login by the
//! opaque token issued at login.

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::constant_time_compare;
use crate::db::{LocalStore, ADMIN_FLAG_KEY, ADMIN_TIME_KEY, CART_KEY};
use crate::errors::AppError;
use crate::models::{AdminLogin, Cart};

/// How long an admin login stays valid.
pub const ADMIN_SESSION_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Local storage key of an entry owned by one client.
fn scoped_key(prefix: &str, scope: &str) -> String {
    format!("{}:{}", prefix, scope)
}

pub struct Session {
    local: LocalStore,
    /// Held across every cart read-modify-write.
    writes: Mutex<()>,
}

impl Session {
    pub fn new(local: LocalStore) -> Self {
        Self {
            local,
            writes: Mutex::new(()),
        }
    }

    // ==================== CART ====================

    pub async fn cart(&self, cart_id: &str) -> Result<Cart, AppError> {
        Ok(self
            .local
            .get_json(&scoped_key(CART_KEY, cart_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn add_to_cart(&self, cart_id: &str, item_id: i64) -> Result<Cart, AppError> {
        let _guard = self.writes.lock().await;
        let mut cart = self.cart(cart_id).await?;
        cart.add(item_id);
        self.local
            .set_json(&scoped_key(CART_KEY, cart_id), &cart)
            .await?;
        Ok(cart)
    }

    pub async fn remove_from_cart(&self, cart_id: &str, item_id: i64) -> Result<Cart, AppError> {
        let _guard = self.writes.lock().await;
        let mut cart = self.cart(cart_id).await?;
        cart.remove(item_id);
        self.local
            .set_json(&scoped_key(CART_KEY, cart_id), &cart)
            .await?;
        Ok(cart)
    }

    pub async fn clear_cart(&self, cart_id: &str) -> Result<(), AppError> {
        let _guard = self.writes.lock().await;
        self.local.remove(&scoped_key(CART_KEY, cart_id)).await
    }

    // ==================== ADMIN ====================

    /// Start an admin session when `password` matches `expected`.
    pub async fn login(&self, password: &str, expected: Option<&str>) -> Result<AdminLogin, AppError> {
        let Some(expected) = expected else {
            return Err(AppError::Unauthorized(
                "Admin login is not configured".to_string(),
            ));
        };
        if !constant_time_compare(password, expected) {
            tracing::warn!("Rejected admin login attempt");
            return Err(AppError::Unauthorized("Invalid password".to_string()));
        }

        let token = Uuid::new_v4().simple().to_string();
        let logged_in_at = Utc::now().timestamp_millis();
        self.local
            .set_raw(&scoped_key(ADMIN_FLAG_KEY, &token), "true")
            .await?;
        self.local
            .set_raw(&scoped_key(ADMIN_TIME_KEY, &token), &logged_in_at.to_string())
            .await?;
        tracing::info!("Admin logged in");

        Ok(AdminLogin {
            token,
            expires_at: logged_in_at + ADMIN_SESSION_MILLIS,
        })
    }

    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.local.remove(&scoped_key(ADMIN_FLAG_KEY, token)).await?;
        self.local.remove(&scoped_key(ADMIN_TIME_KEY, token)).await
    }

    pub async fn is_admin(&self, token: &str) -> Result<bool, AppError> {
        self.is_admin_at(token, Utc::now().timestamp_millis()).await
    }

    /// Expired or malformed login entries are cleared on the way out.
    async fn is_admin_at(&self, token: &str, now_millis: i64) -> Result<bool, AppError> {
        let flag = self.local.get_raw(&scoped_key(ADMIN_FLAG_KEY, token)).await?;
        let login_time = self
            .local
            .get_raw(&scoped_key(ADMIN_TIME_KEY, token))
            .await?
            .and_then(|raw| raw.parse::<i64>().ok());

        match (flag.as_deref(), login_time) {
            (Some("true"), Some(at)) if now_millis - at <= ADMIN_SESSION_MILLIS => {
                Ok(true)
            }
            (None, None) => Ok(false),
            _ => {
                self.logout(token).await?;
                Ok(false)
            }
        }
    }
}
