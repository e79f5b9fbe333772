//! Order model matching the `orders` table.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
}

/// How the order leaves the kitchen. Serialized flat next to the order fields
/// with a `type` discriminator, as the `orders` table stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Fulfillment {
    DineIn {
        table_number: String,
    },
    Takeaway {
        address: String,
        phone_number: String,
    },
}

/// Fulfillment discriminator as submitted by the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    DineIn,
    Takeaway,
}

/// A line of an order. A snapshot of the menu item at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub price: i64,
}

impl OrderItem {
    /// `price * quantity`, or `None` on overflow.
    pub fn subtotal(&self) -> Option<i64> {
        self.price.checked_mul(i64::from(self.quantity))
    }
}

/// Sum of `price * quantity` over the lines, or `None` on overflow.
pub fn order_total(items: &[OrderItem]) -> Option<i64> {
    items
        .iter()
        .try_fold(0i64, |total, item| total.checked_add(item.subtotal()?))
}

/// A submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    #[serde(flatten)]
    pub fulfillment: Fulfillment,
    pub items: Vec<OrderItem>,
    pub total: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: String,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}

/// An order as handed to the data-access layer, before identity is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    #[serde(flatten)]
    pub fulfillment: Fulfillment,
    pub items: Vec<OrderItem>,
    pub total: i64,
}

impl NewOrder {
    /// Build an order whose total is computed from the line snapshots.
    /// `None` when the total does not fit.
    pub fn from_lines(
        customer_name: String,
        fulfillment: Fulfillment,
        items: Vec<OrderItem>,
    ) -> Option<Self> {
        let total = order_total(&items)?;
        Some(Self {
            customer_name,
            fulfillment,
            items,
            total,
        })
    }

    pub fn into_order(self, id: i64, created_at: String) -> Order {
        Order {
            id,
            customer_name: self.customer_name,
            fulfillment: self.fulfillment,
            items: self.items,
            total: self.total,
            status: OrderStatus::Pending,
            created_at,
        }
    }
}

/// Remote insert payload: new orders always start pending.
#[derive(Debug, Serialize)]
pub struct PendingOrderInsert<'a> {
    #[serde(flatten)]
    pub order: &'a NewOrder,
    pub status: OrderStatus,
}

impl<'a> PendingOrderInsert<'a> {
    pub fn new(order: &'a NewOrder) -> Self {
        Self {
            order,
            status: OrderStatus::Pending,
        }
    }
}

/// Request body for `POST /api/checkout`. Lines come from the session cart.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}
