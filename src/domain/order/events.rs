//! Events emitted by the Order aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{topics, EventId, Money, OrderId, Timestamp, UserId};
use crate::domain_event;

use super::OrderStatus;

/// Well-known cancellation reasons carried in `orders.cancelled` payloads.
/// The field itself is free-form.
pub mod reasons {
    pub const USER_INACTIVATED: &str = "user_inactivated";
    pub const TIMEOUT: &str = "timeout";
}

/// An order was placed. The payload is the public order record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub id: OrderId,
    pub user_id: UserId,
    pub product: String,
    pub quantity: u32,
    pub price: Money,
    pub status: OrderStatus,
}

domain_event!(
    OrderCreated,
    event_type = topics::ORDERS_CREATED,
    aggregate_id = id
);

/// An order's lifecycle status changed through the command surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusChanged {
    pub event_id: EventId,
    pub occurred_at: Timestamp,
    pub order_id: OrderId,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

domain_event!(
    OrderStatusChanged,
    event_type = topics::ORDERS_STATUS_CHANGED,
    aggregate_id = order_id
);

/// An order left the open states involuntarily: cancelled by the user
/// inactivation cascade or expired by the deadline scanner. One event per
/// order, never a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCancelled {
    pub event_id: EventId,
    pub occurred_at: Timestamp,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub reason: String,
}

domain_event!(
    OrderCancelled,
    event_type = topics::ORDERS_CANCELLED,
    aggregate_id = order_id
);
