//! UpdateOrderStatusHandler - Command handler for order lifecycle changes.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId};
use crate::domain::order::OrderStatus;
use crate::ports::{Cancellation, OrderStore, OutboxRow};

/// Command to change an order's lifecycle status.
#[derive(Debug, Clone)]
pub struct UpdateOrderStatusCommand {
    pub order_id: OrderId,
    pub status: String,
    pub reason: Option<String>,
}

/// Handler for updating order status.
pub struct UpdateOrderStatusHandler {
    orders: Arc<dyn OrderStore>,
}

impl UpdateOrderStatusHandler {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }

    pub async fn handle(
        &self,
        cmd: UpdateOrderStatusCommand,
        cancel: &Cancellation,
    ) -> Result<(), DomainError> {
        cancel.ensure_active()?;
        let mut order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::OrderNotFound,
                    format!("Order not found: {}", cmd.order_id),
                )
            })?;

        let target = OrderStatus::parse(&cmd.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidStatus,
                format!("Unknown order status '{}'", cmd.status),
            )
        })?;

        match order.change_status(target, cmd.reason) {
            // Same status: succeed without touching the store or the outbox.
            None => Ok(()),
            Some(event) => {
                let row = OutboxRow::for_event(&event);
                self.orders.update_status(&order, Some(row)).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryOrderStore, InMemoryOutboxStore};
    use crate::domain::foundation::{Money, UserId};
    use crate::domain::order::Order;

    async fn seeded() -> (
        UpdateOrderStatusHandler,
        Arc<InMemoryOrderStore>,
        Arc<InMemoryOutboxStore>,
        OrderId,
    ) {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let orders = Arc::new(InMemoryOrderStore::new(outbox.clone()));
        let order = Order::new(UserId::new(), "widget", 1, Money::from_cents(500), 15).unwrap();
        let id = *order.id();
        orders.seed(order).await;
        (UpdateOrderStatusHandler::new(orders.clone()), orders, outbox, id)
    }

    fn cmd(order_id: OrderId, status: &str) -> UpdateOrderStatusCommand {
        UpdateOrderStatusCommand {
            order_id,
            status: status.to_string(),
            reason: None,
        }
    }

    #[tokio::test]
    async fn status_change_updates_order_and_appends_event() {
        let (handler, orders, outbox, id) = seeded().await;

        handler.handle(cmd(id, "PendingPayment"), &Cancellation::never()).await.unwrap();

        let order = orders.get(&id).await.unwrap();
        assert_eq!(order.status(), OrderStatus::PendingPayment);

        let rows = outbox.rows_of_type("orders.status-changed").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].payload["newStatus"], "PendingPayment");
    }

    #[tokio::test]
    async fn cancellation_records_the_timestamp() {
        let (handler, orders, _, id) = seeded().await;

        handler.handle(cmd(id, "Cancelled"), &Cancellation::never()).await.unwrap();

        let order = orders.get(&id).await.unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.cancelled_at().is_some());
    }

    #[tokio::test]
    async fn noop_change_succeeds_without_outbox_row() {
        let (handler, _, outbox, id) = seeded().await;

        handler.handle(cmd(id, "Pending"), &Cancellation::never()).await.unwrap();

        assert!(outbox.rows().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let (handler, _, _, id) = seeded().await;
        let err = handler.handle(cmd(id, "Paid"), &Cancellation::never()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatus);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let (handler, _, _, _) = seeded().await;
        let err = handler.handle(cmd(OrderId::new(), "Ready"), &Cancellation::never()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }
}
