//! Built-in menu shown when neither the remote service nor the local mirror has data.

use chrono::Utc;

use crate::models::MenuItem;

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=200&width=200";

const SEED: &[(&str, i64, &str)] = &[
    ("Nasi Goreng Spesial", 25000, "Makanan Utama"),
    ("Ayam Bakar", 30000, "Makanan Utama"),
    ("Gado-Gado", 20000, "Makanan Utama"),
    ("Es Teh Manis", 5000, "Minuman"),
    ("Jus Jeruk", 8000, "Minuman"),
    ("Es Campur", 12000, "Dessert"),
];

pub fn seed_menu_items() -> Vec<MenuItem> {
    let now = Utc::now().to_rfc3339();
    SEED.iter()
        .zip(1..)
        .map(|(&(name, price, category), id)| MenuItem {
            id,
            name: name.to_string(),
            price,
            category: category.to_string(),
            image_url: Some(PLACEHOLDER_IMAGE.to_string()),
            created_at: now.clone(),
        })
        .collect()
}
