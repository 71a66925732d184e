//! Reaction handler: cancel open orders when their owner goes Inactive.
//!
//! Consumes `users.status-changed` from the bus. Events whose new status is
//! anything but Inactive are ignored. For an inactivation, every order of
//! that user still in a cancellable state is transitioned to Cancelled and
//! one `orders.cancelled` outbox row (reason "user_inactivated") is
//! appended per order, in a single store transaction.
//!
//! Idempotent under replay: the store re-checks each order's state inside
//! the transaction, so a redelivered event finds the orders already
//! Cancelled and writes nothing.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventId, Timestamp};
use crate::domain::order::{reasons, OrderCancelled, OrderStatus, CANCELLABLE};
use crate::domain::user::{UserStatus, UserStatusChanged};
use crate::ports::{BusRecord, EventHandler, OrderStore, OrderTransition, OutboxRow};

/// Handler cancelling a user's open orders on inactivation.
pub struct CancelOrdersOnUserInactivated {
    orders: Arc<dyn OrderStore>,
}

impl CancelOrdersOnUserInactivated {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl EventHandler for CancelOrdersOnUserInactivated {
    async fn handle(&self, record: &BusRecord) -> Result<(), DomainError> {
        let event: UserStatusChanged = record.decode()?;
        if event.new_status != UserStatus::Inactive {
            return Ok(());
        }

        let open = self
            .orders
            .list_by_user_in(&event.user_id, CANCELLABLE)
            .await?;
        if open.is_empty() {
            return Ok(());
        }

        let now = Timestamp::now();
        let changes: Vec<OrderTransition> = open
            .iter()
            .map(|order| OrderTransition {
                order_id: *order.id(),
                expected: CANCELLABLE.to_vec(),
                to: OrderStatus::Cancelled,
                cancelled_at: Some(now),
                outbox: OutboxRow::for_event(&OrderCancelled {
                    event_id: EventId::new(),
                    occurred_at: now,
                    order_id: *order.id(),
                    user_id: event.user_id,
                    reason: reasons::USER_INACTIVATED.to_string(),
                }),
            })
            .collect();

        let cancelled = self.orders.transition(changes).await?;
        tracing::info!(
            user_id = %event.user_id,
            cancelled,
            "Cancelled open orders for inactivated user"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "CancelOrdersOnUserInactivated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryOrderStore, InMemoryOutboxStore};
    use crate::domain::foundation::{Money, UserId};
    use crate::domain::order::Order;

    fn record(user_id: UserId, new_status: UserStatus) -> BusRecord {
        let event = UserStatusChanged {
            event_id: EventId::new(),
            occurred_at: Timestamp::now(),
            user_id,
            old_status: UserStatus::Active,
            new_status,
            reason: Some("admin".to_string()),
        };
        BusRecord::new(
            "users.status-changed",
            Some(user_id.to_string()),
            serde_json::to_vec(&event).unwrap(),
        )
    }

    fn order(user_id: UserId, status: OrderStatus) -> Order {
        let mut order = Order::new(user_id, "widget", 1, Money::from_cents(500), 15).unwrap();
        if status != OrderStatus::Pending {
            order.change_status(status, None).unwrap();
        }
        order
    }

    async fn setup() -> (
        CancelOrdersOnUserInactivated,
        Arc<InMemoryOrderStore>,
        Arc<InMemoryOutboxStore>,
    ) {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let orders = Arc::new(InMemoryOrderStore::new(outbox.clone()));
        (
            CancelOrdersOnUserInactivated::new(orders.clone()),
            orders,
            outbox,
        )
    }

    #[tokio::test]
    async fn cancels_open_orders_and_leaves_completed_ones() {
        let (handler, orders, outbox) = setup().await;
        let user_id = UserId::new();

        let open = order(user_id, OrderStatus::Pending);
        let done = order(user_id, OrderStatus::Completed);
        orders.seed(open.clone()).await;
        orders.seed(done.clone()).await;

        handler.handle(&record(user_id, UserStatus::Inactive)).await.unwrap();

        let cancelled = orders.get(open.id()).await.unwrap();
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        assert!(cancelled.cancelled_at().is_some());
        assert_eq!(orders.get(done.id()).await.unwrap().status(), OrderStatus::Completed);

        let rows = outbox.rows_of_type("orders.cancelled").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].aggregate_id, open.id().to_string());
        assert_eq!(rows[0].payload["reason"], "user_inactivated");
        assert_eq!(rows[0].payload["userId"], user_id.to_string());
    }

    #[tokio::test]
    async fn replaying_the_event_cancels_nothing_further() {
        let (handler, orders, outbox) = setup().await;
        let user_id = UserId::new();
        let open = order(user_id, OrderStatus::Pending);
        orders.seed(open.clone()).await;

        let event = record(user_id, UserStatus::Inactive);
        handler.handle(&event).await.unwrap();
        handler.handle(&event).await.unwrap();

        let stored = orders.get(open.id()).await.unwrap();
        assert_eq!(stored.status(), OrderStatus::Cancelled);
        assert_eq!(outbox.rows_of_type("orders.cancelled").await.len(), 1);
    }

    #[tokio::test]
    async fn cancels_payment_pending_and_ready_orders() {
        let (handler, orders, outbox) = setup().await;
        let user_id = UserId::new();
        orders.seed(order(user_id, OrderStatus::PendingPayment)).await;
        orders.seed(order(user_id, OrderStatus::Ready)).await;

        handler.handle(&record(user_id, UserStatus::Inactive)).await.unwrap();

        assert_eq!(outbox.rows_of_type("orders.cancelled").await.len(), 2);
    }

    #[tokio::test]
    async fn ignores_non_inactivation_events() {
        let (handler, orders, outbox) = setup().await;
        let user_id = UserId::new();
        orders.seed(order(user_id, OrderStatus::Pending)).await;

        handler.handle(&record(user_id, UserStatus::Active)).await.unwrap();

        assert!(outbox.rows().await.is_empty());
    }

    #[tokio::test]
    async fn other_users_orders_are_untouched() {
        let (handler, orders, outbox) = setup().await;
        let victim = UserId::new();
        let bystander = UserId::new();
        orders.seed(order(bystander, OrderStatus::Pending)).await;

        handler.handle(&record(victim, UserStatus::Inactive)).await.unwrap();

        assert!(outbox.rows().await.is_empty());
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_validation_error() {
        let (handler, _, _) = setup().await;
        let record = BusRecord::new("users.status-changed", None, b"garbage".to_vec());

        let err = handler.handle(&record).await.unwrap_err();

        assert_eq!(err.code, crate::domain::foundation::ErrorCode::ValidationFailed);
    }
}
