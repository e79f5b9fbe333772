//! Menu item model matching the `menu_items` table.

use serde::{Deserialize, Serialize};

/// Category labels offered on the menu.
pub const CATEGORIES: &[&str] = &["Makanan Utama", "Minuman", "Dessert", "Snack"];

/// Highest accepted price, in whole rupiah.
pub const MAX_PRICE: i64 = 1_000_000_000;

/// Returns true when `category` is one of the fixed menu labels.
pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

/// A dish or drink offered by the restaurant.
///
/// Prices are whole rupiah. The id is assigned once at creation and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Request body for creating a menu item.
///
/// Also the remote insert payload: the service assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewMenuItem {
    pub fn into_item(self, id: i64, created_at: String) -> MenuItem {
        MenuItem {
            id,
            name: self.name,
            price: self.price,
            category: self.category,
            image_url: self.image_url,
            created_at,
        }
    }
}

/// Partial update of a menu item. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl MenuItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
    }

    /// Merge the patch into `item`.
    pub fn apply(&self, item: &mut MenuItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(image_url) = &self.image_url {
            item.image_url = Some(image_url.clone());
        }
    }
}
