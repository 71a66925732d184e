//! In-memory outbox store for tests and single-process demos.
//!
//! Simulates the lease discipline of the Postgres store: an acquired row is
//! invisible to further `acquire_batch` calls until its lease expires or the
//! row is settled.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{OutboxRow, OutboxStore};

/// In-memory implementation of `OutboxStore`.
pub struct InMemoryOutboxStore {
    rows: Mutex<Vec<OutboxRow>>,
    leases: Mutex<HashMap<Uuid, Timestamp>>,
}

impl InMemoryOutboxStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            leases: Mutex::new(HashMap::new()),
        }
    }

    /// Appends a row, as the domain stores do from inside their combined
    /// write operations.
    pub async fn append(&self, row: OutboxRow) {
        self.rows.lock().await.push(row);
    }

    // === Test helpers ===

    /// Snapshot of every row.
    pub async fn rows(&self) -> Vec<OutboxRow> {
        self.rows.lock().await.clone()
    }

    /// Rows still eligible for delivery.
    pub async fn pending_count(&self) -> usize {
        self.rows.lock().await.iter().filter(|r| r.is_pending()).count()
    }

    /// Rows sealed by delivery or dead-lettering.
    pub async fn sent_count(&self) -> usize {
        self.rows.lock().await.iter().filter(|r| !r.is_pending()).count()
    }

    /// Rows of a given event type.
    pub async fn rows_of_type(&self, event_type: &str) -> Vec<OutboxRow> {
        self.rows
            .lock()
            .await
            .iter()
            .filter(|r| r.event_type == event_type)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryOutboxStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn acquire_batch(
        &self,
        limit: u32,
        lock_for: Duration,
    ) -> Result<Vec<OutboxRow>, DomainError> {
        let rows = self.rows.lock().await;
        let mut leases = self.leases.lock().await;
        let now = Timestamp::now();
        let lease_until = now.plus_seconds(lock_for.as_secs() as i64);

        let mut batch: Vec<OutboxRow> = rows
            .iter()
            .filter(|r| r.is_pending())
            .filter(|r| match leases.get(&r.id) {
                Some(until) => until.is_before(&now),
                None => true,
            })
            .cloned()
            .collect();
        batch.sort_by_key(|r| r.created_at);
        batch.truncate(limit as usize);

        for row in &batch {
            leases.insert(row.id, lease_until);
        }
        Ok(batch)
    }

    async fn mark_sent(&self, id: Uuid) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| row_not_found(id))?;
        row.mark_sent();
        self.leases.lock().await.remove(&id);
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        retry_count: u32,
        error: &str,
        permanent: bool,
    ) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| row_not_found(id))?;
        row.mark_failed(retry_count, error, permanent);
        self.leases.lock().await.remove(&id);
        Ok(())
    }

    async fn list_unsent(&self, limit: u32) -> Result<Vec<OutboxRow>, DomainError> {
        let rows = self.rows.lock().await;
        let mut pending: Vec<OutboxRow> = rows.iter().filter(|r| r.is_pending()).cloned().collect();
        pending.sort_by_key(|r| r.created_at);
        pending.truncate(limit as usize);
        Ok(pending)
    }

    async fn increment_retry(&self, id: Uuid) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id && r.is_pending())
            .ok_or_else(|| row_not_found(id))?;
        row.retry_count += 1;
        Ok(())
    }
}

fn row_not_found(id: Uuid) -> DomainError {
    DomainError::new(
        ErrorCode::OutboxRowNotFound,
        format!("Outbox row not found: {}", id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(event_type: &str) -> OutboxRow {
        OutboxRow::new(event_type, "agg-1", json!({}))
    }

    #[tokio::test]
    async fn acquire_leases_rows_until_settled() {
        let store = InMemoryOutboxStore::new();
        store.append(row("users.created")).await;

        let first = store
            .acquire_batch(10, Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        // Leased: a second drainer sees nothing.
        let second = store
            .acquire_batch(10, Duration::from_secs(30))
            .await
            .unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn settling_releases_the_lease() {
        let store = InMemoryOutboxStore::new();
        store.append(row("users.created")).await;

        let batch = store
            .acquire_batch(10, Duration::from_secs(30))
            .await
            .unwrap();
        store
            .mark_failed(batch[0].id, 1, "transient", false)
            .await
            .unwrap();

        let reacquired = store
            .acquire_batch(10, Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(reacquired.len(), 1);
        assert_eq!(reacquired[0].retry_count, 1);
    }

    #[tokio::test]
    async fn expired_lease_makes_row_visible_again() {
        let store = InMemoryOutboxStore::new();
        store.append(row("users.created")).await;

        store.acquire_batch(10, Duration::ZERO).await.unwrap();

        let reacquired = store
            .acquire_batch(10, Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(reacquired.len(), 1);
    }

    #[tokio::test]
    async fn acquire_respects_limit_and_creation_order() {
        let store = InMemoryOutboxStore::new();
        for i in 0..5 {
            let mut r = row("users.created");
            r.aggregate_id = format!("agg-{}", i);
            store.append(r).await;
        }

        let batch = store
            .acquire_batch(2, Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].aggregate_id, "agg-0");
        assert_eq!(batch[1].aggregate_id, "agg-1");
    }

    #[tokio::test]
    async fn sent_rows_never_reappear() {
        let store = InMemoryOutboxStore::new();
        store.append(row("users.created")).await;

        let batch = store
            .acquire_batch(10, Duration::ZERO)
            .await
            .unwrap();
        store.mark_sent(batch[0].id).await.unwrap();

        assert!(store
            .acquire_batch(10, Duration::ZERO)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.sent_count().await, 1);
    }

    #[tokio::test]
    async fn mark_sent_unknown_row_is_not_found() {
        let store = InMemoryOutboxStore::new();
        let err = store.mark_sent(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OutboxRowNotFound);
    }

    #[tokio::test]
    async fn increment_retry_advances_pending_rows_only() {
        let store = InMemoryOutboxStore::new();
        store.append(row("users.created")).await;
        let id = store.rows().await[0].id;

        store.increment_retry(id).await.unwrap();
        assert_eq!(store.rows().await[0].retry_count, 1);

        store.mark_sent(id).await.unwrap();
        assert!(store.increment_retry(id).await.is_err());
    }

    #[tokio::test]
    async fn list_unsent_returns_pending_in_creation_order() {
        let store = InMemoryOutboxStore::new();
        store.append(row("a")).await;
        store.append(row("b")).await;
        let first_id = store.rows().await[0].id;
        store.mark_sent(first_id).await.unwrap();

        let unsent = store.list_unsent(10).await.unwrap();
        assert_eq!(unsent.len(), 1);
        assert_eq!(unsent[0].event_type, "b");
    }
}
