//! Menu API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, written, ApiResult};
use crate::errors::AppError;
use crate::models::{
    is_known_category, MenuItem, MenuItemPatch, NewMenuItem, CATEGORIES, MAX_PRICE,
};
use crate::AppState;

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    Ok(())
}

fn validate_price(price: i64) -> Result<(), AppError> {
    if !(0..=MAX_PRICE).contains(&price) {
        return Err(AppError::Validation(format!(
            "Price must be between 0 and {}",
            MAX_PRICE
        )));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), AppError> {
    if !is_known_category(category) {
        return Err(AppError::Validation(format!(
            "Category must be one of: {}",
            CATEGORIES.join(", ")
        )));
    }
    Ok(())
}

/// GET /api/menu - List menu items.
pub async fn list_menu(State(state): State<AppState>) -> ApiResult<Vec<MenuItem>> {
    success(state.store.list_menu_items().await?)
}

/// POST /api/admin/menu - Create a menu item.
pub async fn create_menu_item(
    State(state): State<AppState>,
    Json(mut request): Json<NewMenuItem>,
) -> ApiResult<MenuItem> {
    validate_name(&request.name)?;
    validate_price(request.price)?;
    validate_category(&request.category)?;
    request.name = request.name.trim().to_string();

    written(state.store.create_menu_item(request).await?)
}

/// PUT /api/admin/menu/:id - Update some fields of a menu item.
pub async fn update_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut patch): Json<MenuItemPatch>,
) -> ApiResult<Option<MenuItem>> {
    if patch.is_empty() {
        return Err(AppError::Validation("No changes provided".to_string()));
    }
    if let Some(name) = &patch.name {
        validate_name(name)?;
        patch.name = Some(name.trim().to_string());
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }
    if let Some(category) = &patch.category {
        validate_category(category)?;
    }

    let outcome = state.store.update_menu_item(id, patch).await?;
    if outcome.value().is_none() {
        return Err(AppError::NotFound(format!("Menu item {} not found", id)));
    }
    written(outcome)
}

/// DELETE /api/admin/menu/:id - Delete a menu item.
pub async fn delete_menu_item(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    written(state.store.delete_menu_item(id).await?)
}
