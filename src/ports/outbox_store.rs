//! OutboxStore port - Interface for the transactional outbox table.
//!
//! The outbox implements the Transactional Outbox Pattern: every domain
//! event is persisted in the same database transaction as the domain change
//! that produced it, so no event is lost even if the process crashes before
//! the bus sees it.
//!
//! ## Pipeline
//!
//! 1. Command handler saves aggregate AND outbox row in one transaction
//! 2. OutboxDrainer acquires pending rows under a lease
//! 3. BusPublisher delivers each row to its topic (or the dead-letter topic)
//! 4. The drainer settles the row: sent, retry-scheduled, or dead-lettered
//!
//! Appending is not part of this trait: it happens inside the domain
//! transaction, through the store adapters' combined write operations.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, DomainEvent, Timestamp};

/// A row in the outbox table.
///
/// `sent_at` doubles as the delivery flag: the row is eligible for draining
/// exactly while it is `None`. Once set, the row is immutable.
#[derive(Debug, Clone)]
pub struct OutboxRow {
    /// Unique identifier for this row (distinct from any event id inside
    /// the payload)
    pub id: Uuid,

    /// Event type string; also the destination topic
    pub event_type: String,

    /// Identity of the aggregate whose change produced this row; used as
    /// the partition key on the bus
    pub aggregate_id: String,

    /// Opaque serialized event payload
    pub payload: JsonValue,

    /// Number of failed delivery attempts; only ever increases
    pub retry_count: u32,

    /// When the row was appended
    pub created_at: Timestamp,

    /// When the row was delivered (or dead-lettered); `None` while pending
    pub sent_at: Option<Timestamp>,

    /// Last delivery error, for operators
    pub last_error: Option<String>,
}

impl OutboxRow {
    /// Creates a pending row from raw parts.
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            aggregate_id: aggregate_id.into(),
            payload,
            retry_count: 0,
            created_at: Timestamp::now(),
            sent_at: None,
            last_error: None,
        }
    }

    /// Creates a pending row for a domain event.
    pub fn for_event<E: DomainEvent>(event: &E) -> Self {
        Self::new(event.event_type(), event.aggregate_id(), event.to_payload())
    }

    /// Returns true while the row is still eligible for delivery.
    pub fn is_pending(&self) -> bool {
        self.sent_at.is_none()
    }

    /// Marks the row delivered. Idempotent: an already-sent row keeps its
    /// original timestamp.
    pub fn mark_sent(&mut self) {
        if self.sent_at.is_none() {
            self.sent_at = Some(Timestamp::now());
        }
    }

    /// Records a failed delivery attempt. Retry counts never move backward;
    /// a permanent failure also seals the row so it never drains again.
    pub fn mark_failed(&mut self, retry_count: u32, error: impl Into<String>, permanent: bool) {
        self.retry_count = self.retry_count.max(retry_count);
        self.last_error = Some(error.into());
        if permanent {
            self.mark_sent();
        }
    }
}

/// Port for querying and settling outbox rows.
///
/// Implementations must make `acquire_batch` exclusive between drainers
/// (a lease that expires after the lock duration) and must keep retry
/// counts monotone.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Acquires up to `limit` pending rows, oldest first, leasing them for
    /// `lock_for`. Rows already leased by another drainer are skipped until
    /// their lease expires.
    async fn acquire_batch(
        &self,
        limit: u32,
        lock_for: Duration,
    ) -> Result<Vec<OutboxRow>, DomainError>;

    /// Marks a row delivered and releases its lease. Idempotent.
    async fn mark_sent(&self, id: Uuid) -> Result<(), DomainError>;

    /// Records a failed attempt and releases the lease. When `permanent`,
    /// the row is sealed and never drains again.
    async fn mark_failed(
        &self,
        id: Uuid,
        retry_count: u32,
        error: &str,
        permanent: bool,
    ) -> Result<(), DomainError>;

    /// Returns pending rows, oldest first, without leasing them. Serves the
    /// operational HTTP surface for pull-based dispatchers.
    async fn list_unsent(&self, limit: u32) -> Result<Vec<OutboxRow>, DomainError>;

    /// Advances a pending row's retry count by one. Operational surface.
    async fn increment_retry(&self, id: Uuid) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_row_is_pending() {
        let row = OutboxRow::new("users.created", "user-1", json!({"name": "Alice"}));
        assert!(row.is_pending());
        assert_eq!(row.retry_count, 0);
        assert!(row.last_error.is_none());
    }

    #[test]
    fn mark_sent_seals_the_row() {
        let mut row = OutboxRow::new("users.created", "user-1", json!({}));
        row.mark_sent();
        assert!(!row.is_pending());

        let first = row.sent_at;
        row.mark_sent();
        assert_eq!(row.sent_at, first);
    }

    #[test]
    fn mark_failed_keeps_row_pending_for_transient_errors() {
        let mut row = OutboxRow::new("users.created", "user-1", json!({}));
        row.mark_failed(1, "broker unreachable", false);

        assert!(row.is_pending());
        assert_eq!(row.retry_count, 1);
        assert_eq!(row.last_error.as_deref(), Some("broker unreachable"));
    }

    #[test]
    fn mark_failed_permanent_seals_the_row() {
        let mut row = OutboxRow::new("users.created", "user-1", json!({}));
        row.mark_failed(3, "MaxRetriesExceeded", true);

        assert!(!row.is_pending());
        assert_eq!(row.retry_count, 3);
    }

    #[test]
    fn retry_count_never_moves_backward() {
        let mut row = OutboxRow::new("users.created", "user-1", json!({}));
        row.mark_failed(4, "e1", false);
        row.mark_failed(2, "e2", false);
        assert_eq!(row.retry_count, 4);
    }

    #[test]
    fn for_event_captures_type_aggregate_and_payload() {
        use crate::domain::foundation::UserId;
        use crate::domain::user::UserCreated;

        let event = UserCreated {
            id: UserId::new(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        let row = OutboxRow::for_event(&event);

        assert_eq!(row.event_type, "users.created");
        assert_eq!(row.aggregate_id, event.id.to_string());
        assert_eq!(row.payload["Email"], "alice@example.com");
    }
}
