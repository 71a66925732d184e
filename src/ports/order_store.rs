//! OrderStore port - Persistence for the Order aggregate.
//!
//! Like `UserStore`, state-changing writes take their outbox rows so the
//! adapter commits domain change and event together. `transition` is the
//! seam for the cascade handler and the expiry scanner: each change is
//! re-checked against its expected source states inside the transaction,
//! which is what keeps replays idempotent: a change that no longer applies
//! writes no outbox row.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, Timestamp, UserId};
use crate::domain::order::{Order, OrderStatus};

use super::OutboxRow;

/// A conditional status change applied inside one store transaction.
#[derive(Debug, Clone)]
pub struct OrderTransition {
    /// Order to transition
    pub order_id: OrderId,

    /// States the order must still be in for the change to apply
    pub expected: Vec<OrderStatus>,

    /// Target state
    pub to: OrderStatus,

    /// Cancellation timestamp to record (Cancelled transitions only)
    pub cancelled_at: Option<Timestamp>,

    /// Outbox row appended iff the change applies
    pub outbox: OutboxRow,
}

/// Port for persisting orders together with their outbox rows.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order and appends its `orders.created` row atomically.
    async fn insert(&self, order: &Order, event: OutboxRow) -> Result<(), DomainError>;

    /// Persists a status change, appending the outbox row when one was
    /// produced (no-ops pass `None` and write no event).
    async fn update_status(
        &self,
        order: &Order,
        event: Option<OutboxRow>,
    ) -> Result<(), DomainError>;

    /// Looks up an order by id.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Returns a user's orders currently in any of the given states.
    async fn list_by_user_in(
        &self,
        user_id: &UserId,
        statuses: &[OrderStatus],
    ) -> Result<Vec<Order>, DomainError>;

    /// Returns up to `limit` orders in the given states whose deadline has
    /// passed, oldest deadline first.
    async fn list_expired(
        &self,
        now: Timestamp,
        statuses: &[OrderStatus],
        limit: u32,
    ) -> Result<Vec<Order>, DomainError>;

    /// Applies a batch of conditional transitions in one transaction and
    /// returns how many actually took hold. Changes whose order has already
    /// left the expected states are skipped along with their outbox rows.
    async fn transition(&self, changes: Vec<OrderTransition>) -> Result<u32, DomainError>;
}
