//! BusPublisher port - Interface for delivering outbox rows to the bus.
//!
//! The publisher owns the retry-cap policy: a row whose retry count has
//! reached the configured maximum is not sent to its destination topic at
//! all. Instead its payload is wrapped in a dead-letter envelope and
//! published to the quarantine topic, and the outcome is permanent so the
//! drainer seals the row.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;

use super::OutboxRow;

/// Reason recorded on dead-letter envelopes.
pub const DEAD_LETTER_REASON: &str = "MaxRetriesExceeded";

/// Result of a single publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The bus durably acknowledged the record.
    Delivered,
    /// Transient failure; the row should be retried after its lease expires.
    Retry(String),
    /// Permanent failure (payload unrecoverable or retries exhausted); the
    /// row must be sealed so it never drains again.
    Failed(String),
}

/// Envelope wrapped around a payload that exhausted its retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterEnvelope {
    pub id: Uuid,
    pub event_type: String,
    pub payload: JsonValue,
    pub retry_count: u32,
    pub occurred_at: Timestamp,
    pub reason: String,
}

impl DeadLetterEnvelope {
    /// Wraps an exhausted outbox row.
    pub fn for_row(row: &OutboxRow) -> Self {
        Self {
            id: row.id,
            event_type: row.event_type.clone(),
            payload: row.payload.clone(),
            retry_count: row.retry_count,
            occurred_at: Timestamp::now(),
            reason: DEAD_LETTER_REASON.to_string(),
        }
    }
}

/// Port for the bus producer.
///
/// Implementations must:
/// - use the row's event type as the destination topic
/// - key records by aggregate id so per-aggregate order survives partitioning
/// - treat produce errors as transient unless the payload itself is the
///   problem or the retry cap is reached
#[async_trait]
pub trait BusPublisher: Send + Sync {
    /// Attempts to deliver one outbox row.
    async fn publish(&self, row: &OutboxRow) -> PublishOutcome;

    /// Flushes buffered records, waiting at most `grace`. Called once on
    /// shutdown.
    async fn flush(&self, grace: Duration);
}
