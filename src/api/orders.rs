//! Checkout and order queue endpoints.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use super::{cart_id, success, written, ApiResult};
use crate::errors::AppError;
use crate::models::{
    Cart, CheckoutRequest, Fulfillment, MenuItem, NewOrder, Order, OrderItem, OrderType,
};
use crate::AppState;

/// Check the customer details and resolve the fulfillment payload.
fn validate_checkout(request: &CheckoutRequest) -> Result<(String, Fulfillment), AppError> {
    let customer_name = request.customer_name.trim();
    if customer_name.is_empty() {
        return Err(AppError::Validation("Customer name is required".to_string()));
    }

    let field = |value: &Option<String>| value.as_deref().map(str::trim).unwrap_or_default().to_string();

    let fulfillment = match request.order_type {
        OrderType::DineIn => {
            let table_number = field(&request.table_number);
            if table_number.is_empty() {
                return Err(AppError::Validation(
                    "Table number is required for dine-in orders".to_string(),
                ));
            }
            Fulfillment::DineIn { table_number }
        }
        OrderType::Takeaway => {
            let address = field(&request.address);
            let phone_number = field(&request.phone_number);
            if address.is_empty() || phone_number.is_empty() {
                return Err(AppError::Validation(
                    "Address and phone number are required for takeaway orders".to_string(),
                ));
            }
            Fulfillment::Takeaway {
                address,
                phone_number,
            }
        }
    };

    Ok((customer_name.to_string(), fulfillment))
}

/// Snapshot cart lines against the current menu. Lines whose item has left
/// the menu are dropped.
fn cart_lines(cart: &Cart, menu: &[MenuItem]) -> Vec<OrderItem> {
    cart.lines()
        .filter_map(|(item_id, quantity)| {
            menu.iter()
                .find(|item| item.id == item_id)
                .map(|item| OrderItem {
                    name: item.name.clone(),
                    quantity,
                    price: item.price,
                })
        })
        .collect()
}

/// POST /api/checkout - Turn the session cart into a pending order.
pub async fn checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Order> {
    let cart_id = cart_id(&headers)?;
    let (customer_name, fulfillment) = validate_checkout(&request)?;

    let cart = state.session.cart(&cart_id).await?;
    if cart.is_empty() {
        return Err(AppError::Validation("Cart is empty".to_string()));
    }
    let menu = state.store.list_menu_items().await?;
    let lines = cart_lines(&cart, &menu);
    if lines.is_empty() {
        return Err(AppError::Validation(
            "Cart has no items from the current menu".to_string(),
        ));
    }

    let order = NewOrder::from_lines(customer_name, fulfillment, lines)
        .ok_or_else(|| AppError::Validation("Order total is too large".to_string()))?;
    let outcome = state.store.create_order(order).await?;
    state.session.clear_cart(&cart_id).await?;

    tracing::info!(
        "Order {} placed for {} with {} portions",
        outcome.value().id,
        outcome.value().customer_name,
        cart.item_count()
    );
    if !outcome.is_synced() {
        tracing::warn!("Order {} is held in local storage only", outcome.value().id);
    }
    written(outcome)
}

/// GET /api/admin/orders - List all orders.
pub async fn list_orders(State(state): State<AppState>) -> ApiResult<Vec<Order>> {
    success(state.store.list_orders().await?)
}

/// GET /api/admin/orders/pending - List orders awaiting completion.
pub async fn list_pending_orders(State(state): State<AppState>) -> ApiResult<Vec<Order>> {
    success(state.store.list_pending_orders().await?)
}

/// DELETE /api/admin/orders/:id - Complete an order by removing it from the queue.
pub async fn complete_order(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    written(state.store.delete_order(id).await?)
}
