//! Request and response DTOs for order endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Money, OrderId, Timestamp, UserId};
use crate::domain::order::{Order, OrderStatus};

/// Body of POST /api/orders. Quantity and price arrive as plain integers
/// (price in minor units) and are range-checked in the handler so that bad
/// values surface as 400 validation problems rather than decode failures.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: i64,
}

/// Body of PATCH /api/orders/:id/status.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Public order record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub user_id: UserId,
    pub product: String,
    pub quantity: u32,
    pub price: Money,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<Timestamp>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: *order.id(),
            user_id: *order.user_id(),
            product: order.product().to_string(),
            quantity: order.quantity(),
            price: order.price(),
            status: order.status(),
            created_at: *order.created_at(),
            expires_at: *order.expires_at(),
            cancelled_at: order.cancelled_at().copied(),
        }
    }
}
