//! In-memory order store for tests and single-process demos.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp, UserId};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{OrderStore, OrderTransition, OutboxRow};

use super::InMemoryOutboxStore;

/// In-memory implementation of `OrderStore`.
pub struct InMemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    outbox: Arc<InMemoryOutboxStore>,
}

impl InMemoryOrderStore {
    /// Creates an empty store writing events into the given outbox.
    pub fn new(outbox: Arc<InMemoryOutboxStore>) -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            outbox,
        }
    }

    /// Seeds an order without producing an outbox row (test setup).
    pub async fn seed(&self, order: Order) {
        self.orders.lock().await.push(order);
    }

    /// Snapshot of one order.
    pub async fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders.lock().await.iter().find(|o| o.id() == id).cloned()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order, event: OutboxRow) -> Result<(), DomainError> {
        self.orders.lock().await.push(order.clone());
        self.outbox.append(event).await;
        Ok(())
    }

    async fn update_status(
        &self,
        order: &Order,
        event: Option<OutboxRow>,
    ) -> Result<(), DomainError> {
        let mut orders = self.orders.lock().await;
        let slot = orders
            .iter_mut()
            .find(|o| o.id() == order.id())
            .ok_or_else(|| order_not_found(order.id()))?;
        *slot = order.clone();
        if let Some(row) = event {
            self.outbox.append(row).await;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.get(id).await)
    }

    async fn list_by_user_in(
        &self,
        user_id: &UserId,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .orders
            .lock()
            .await
            .iter()
            .filter(|o| o.user_id() == user_id && statuses.contains(&o.status()))
            .cloned()
            .collect())
    }

    async fn list_expired(
        &self,
        now: Timestamp,
        statuses: &[OrderStatus],
        limit: u32,
    ) -> Result<Vec<Order>, DomainError> {
        let orders = self.orders.lock().await;
        let mut due: Vec<Order> = orders
            .iter()
            .filter(|o| statuses.contains(&o.status()) && !o.expires_at().is_after(&now))
            .cloned()
            .collect();
        due.sort_by_key(|o| *o.expires_at());
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn transition(&self, changes: Vec<OrderTransition>) -> Result<u32, DomainError> {
        let mut orders = self.orders.lock().await;
        let mut applied = 0;
        for change in changes {
            let Some(order) = orders.iter_mut().find(|o| *o.id() == change.order_id) else {
                continue;
            };
            // Re-check under the "transaction": the order may have left the
            // expected states since it was listed.
            if !change.expected.contains(&order.status()) {
                continue;
            }
            order.apply_transition(change.to, change.cancelled_at);
            self.outbox.append(change.outbox).await;
            applied += 1;
        }
        Ok(applied)
    }
}

fn order_not_found(id: &OrderId) -> DomainError {
    DomainError::new(ErrorCode::OrderNotFound, format!("Order not found: {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, Money};
    use crate::domain::order::{reasons, OrderCancelled, CANCELLABLE};

    fn order(user_id: UserId) -> Order {
        Order::new(user_id, "widget", 1, Money::from_cents(500), 15).unwrap()
    }

    fn cancel_transition(order: &Order, now: Timestamp) -> OrderTransition {
        OrderTransition {
            order_id: *order.id(),
            expected: CANCELLABLE.to_vec(),
            to: OrderStatus::Cancelled,
            cancelled_at: Some(now),
            outbox: OutboxRow::for_event(&OrderCancelled {
                event_id: EventId::new(),
                occurred_at: now,
                order_id: *order.id(),
                user_id: *order.user_id(),
                reason: reasons::USER_INACTIVATED.to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn transition_applies_and_writes_outbox_row() {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let store = InMemoryOrderStore::new(outbox.clone());
        let user_id = UserId::new();
        let order = order(user_id);
        store.seed(order.clone()).await;

        let now = Timestamp::now();
        let applied = store
            .transition(vec![cancel_transition(&order, now)])
            .await
            .unwrap();

        assert_eq!(applied, 1);
        let stored = store.get(order.id()).await.unwrap();
        assert_eq!(stored.status(), OrderStatus::Cancelled);
        assert_eq!(stored.cancelled_at(), Some(&now));
        assert_eq!(outbox.pending_count().await, 1);
    }

    #[tokio::test]
    async fn transition_skips_orders_that_left_the_expected_states() {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let store = InMemoryOrderStore::new(outbox.clone());
        let mut order = order(UserId::new());
        order.change_status(OrderStatus::Completed, None).unwrap();
        store.seed(order.clone()).await;

        let applied = store
            .transition(vec![cancel_transition(&order, Timestamp::now())])
            .await
            .unwrap();

        assert_eq!(applied, 0);
        assert_eq!(store.get(order.id()).await.unwrap().status(), OrderStatus::Completed);
        // No event for a change that did not take hold.
        assert_eq!(outbox.pending_count().await, 0);
    }

    #[tokio::test]
    async fn list_by_user_in_filters_by_owner_and_status() {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let store = InMemoryOrderStore::new(outbox);
        let user_id = UserId::new();

        store.seed(order(user_id)).await;
        let mut completed = order(user_id);
        completed.change_status(OrderStatus::Completed, None).unwrap();
        store.seed(completed).await;
        store.seed(order(UserId::new())).await;

        let open = store
            .list_by_user_in(&user_id, &[OrderStatus::Pending])
            .await
            .unwrap();
        assert_eq!(open.len(), 1);
    }

    #[tokio::test]
    async fn list_expired_returns_overdue_orders_oldest_first() {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let store = InMemoryOrderStore::new(outbox);
        let now = Timestamp::now();
        let user_id = UserId::new();

        let overdue = Order::from_parts(
            OrderId::new(),
            user_id,
            "widget".to_string(),
            1,
            Money::from_cents(500),
            OrderStatus::PendingPayment,
            now.minus_minutes(30),
            now.minus_minutes(15),
            None,
        );
        store.seed(overdue.clone()).await;
        store.seed(order(user_id)).await; // fresh Pending order

        let due = store
            .list_expired(now, &[OrderStatus::PendingPayment, OrderStatus::Ready], 10)
            .await
            .unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id(), overdue.id());
    }
}
