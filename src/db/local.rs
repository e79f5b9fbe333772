//! Keyed JSON entries emulating browser local storage.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{MenuItem, Order};

/// Mirror of the `menu_items` table.
pub const MENU_KEY: &str = "restaurant_menu";
/// Mirror of the `orders` table.
pub const ORDERS_KEY: &str = "restaurant_orders";
/// Per-client entries are stored as `<prefix>:<cart id or admin token>`.
pub const CART_KEY: &str = "restaurant_cart";
pub const ADMIN_FLAG_KEY: &str = "adminLoggedIn";
pub const ADMIN_TIME_KEY: &str = "adminLoginTime";

/// Named entries in the local SQLite file. A missing key means the entry was
/// never initialised, which callers treat differently from an empty list.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    pub async fn set_raw(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Read and decode a JSON entry.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.get_raw(key).await? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                tracing::error!("Corrupt local entry {}: {}", key, e);
                AppError::Database(format!("Corrupt local entry {}: {}", key, e))
            }),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", key, e)))?;
        self.set_raw(key, &raw).await
    }

    // ==================== MIRROR ENTRIES ====================

    pub async fn menu_items(&self) -> Result<Option<Vec<MenuItem>>, AppError> {
        self.get_json(MENU_KEY).await
    }

    pub async fn save_menu_items(&self, items: &[MenuItem]) -> Result<(), AppError> {
        self.set_json(MENU_KEY, items).await
    }

    pub async fn orders(&self) -> Result<Option<Vec<Order>>, AppError> {
        self.get_json(ORDERS_KEY).await
    }

    pub async fn save_orders(&self, orders: &[Order]) -> Result<(), AppError> {
        self.set_json(ORDERS_KEY, orders).await
    }
}
