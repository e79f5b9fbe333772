//! Cart API endpoints. Each client names its cart with the `X-Cart-Id` header.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::Cart;
use crate::AppState;

/// Header naming the caller's cart.
pub const CART_ID_HEADER: &str = "x-cart-id";

/// The caller's cart id: 1 to 64 ASCII letters, digits, `-` or `_`.
pub fn cart_id(headers: &HeaderMap) -> Result<String, AppError> {
    let id = headers
        .get(CART_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    let well_formed = !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !well_formed {
        return Err(AppError::Validation(
            "X-Cart-Id header with 1-64 letters, digits, '-' or '_' is required".to_string(),
        ));
    }
    Ok(id.to_string())
}

/// GET /api/cart - Current cart.
pub async fn get_cart(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Cart> {
    let cart_id = cart_id(&headers)?;
    success(state.session.cart(&cart_id).await?)
}

/// POST /api/cart/items/:id - Add one portion of a menu item.
pub async fn add_to_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Cart> {
    let cart_id = cart_id(&headers)?;
    success(state.session.add_to_cart(&cart_id, id).await?)
}

/// DELETE /api/cart/items/:id - Remove one portion of a menu item.
pub async fn remove_from_cart(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Cart> {
    let cart_id = cart_id(&headers)?;
    success(state.session.remove_from_cart(&cart_id, id).await?)
}

/// DELETE /api/cart - Empty the cart.
pub async fn clear_cart(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Cart> {
    let cart_id = cart_id(&headers)?;
    state.session.clear_cart(&cart_id).await?;
    success(Cart::default())
}
