//! In-memory bus publisher: a scriptable test double for the producer.
//!
//! Mirrors the full publisher contract including the retry cap and the
//! dead-letter envelope, so integration tests exercise the same policy the
//! Kafka adapter enforces.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::ports::{
    BusPublisher, DeadLetterEnvelope, OutboxRow, PublishOutcome, DEAD_LETTER_REASON,
};

/// In-memory implementation of `BusPublisher`.
pub struct InMemoryBusPublisher {
    max_retries: u32,
    dead_letter_topic: String,
    topics: Mutex<HashMap<String, Vec<JsonValue>>>,
    fail_remaining: AtomicU32,
    fail_always: AtomicBool,
}

impl InMemoryBusPublisher {
    /// Creates a publisher with the given retry cap and dead-letter topic.
    pub fn new(max_retries: u32, dead_letter_topic: impl Into<String>) -> Self {
        Self {
            max_retries,
            dead_letter_topic: dead_letter_topic.into(),
            topics: Mutex::new(HashMap::new()),
            fail_remaining: AtomicU32::new(0),
            fail_always: AtomicBool::new(false),
        }
    }

    // === Test helpers ===

    /// Makes the next `n` publish attempts fail transiently.
    pub fn fail_next(&self, n: u32) {
        self.fail_remaining.store(n, Ordering::SeqCst);
    }

    /// Makes every publish attempt fail transiently until cleared.
    pub fn fail_always(&self, fail: bool) {
        self.fail_always.store(fail, Ordering::SeqCst);
    }

    /// Records published to a topic.
    pub async fn messages(&self, topic: &str) -> Vec<JsonValue> {
        self.topics
            .lock()
            .await
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of records published to a topic.
    pub async fn topic_count(&self, topic: &str) -> usize {
        self.messages(topic).await.len()
    }
}

#[async_trait]
impl BusPublisher for InMemoryBusPublisher {
    async fn publish(&self, row: &OutboxRow) -> PublishOutcome {
        // Retries exhausted: quarantine instead of the destination topic.
        if row.retry_count >= self.max_retries {
            let envelope = DeadLetterEnvelope::for_row(row);
            let value = serde_json::to_value(&envelope)
                .expect("Dead-letter envelope serialization should never fail");
            self.topics
                .lock()
                .await
                .entry(self.dead_letter_topic.clone())
                .or_default()
                .push(value);
            return PublishOutcome::Failed(DEAD_LETTER_REASON.to_string());
        }

        if self.fail_always.load(Ordering::SeqCst) {
            return PublishOutcome::Retry("scripted transient failure".to_string());
        }
        if self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return PublishOutcome::Retry("scripted transient failure".to_string());
        }

        self.topics
            .lock()
            .await
            .entry(row.event_type.clone())
            .or_default()
            .push(row.payload.clone());
        PublishOutcome::Delivered
    }

    async fn flush(&self, _grace: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(retry_count: u32) -> OutboxRow {
        let mut row = OutboxRow::new("users.created", "agg-1", json!({"k": "v"}));
        row.retry_count = retry_count;
        row
    }

    #[tokio::test]
    async fn publishes_to_the_event_type_topic() {
        let bus = InMemoryBusPublisher::new(3, "dead-letter");
        let outcome = bus.publish(&row(0)).await;

        assert_eq!(outcome, PublishOutcome::Delivered);
        assert_eq!(bus.topic_count("users.created").await, 1);
        assert_eq!(bus.messages("users.created").await[0]["k"], "v");
    }

    #[tokio::test]
    async fn scripted_failures_are_transient() {
        let bus = InMemoryBusPublisher::new(3, "dead-letter");
        bus.fail_next(1);

        assert!(matches!(bus.publish(&row(0)).await, PublishOutcome::Retry(_)));
        assert_eq!(bus.publish(&row(1)).await, PublishOutcome::Delivered);
    }

    #[tokio::test]
    async fn exhausted_rows_go_to_the_dead_letter_topic() {
        let bus = InMemoryBusPublisher::new(2, "dead-letter");
        let row = row(2);

        let outcome = bus.publish(&row).await;

        assert_eq!(outcome, PublishOutcome::Failed("MaxRetriesExceeded".to_string()));
        assert_eq!(bus.topic_count("users.created").await, 0);

        let quarantined = bus.messages("dead-letter").await;
        assert_eq!(quarantined.len(), 1);
        assert_eq!(quarantined[0]["eventType"], "users.created");
        assert_eq!(quarantined[0]["retryCount"], 2);
        assert_eq!(quarantined[0]["reason"], "MaxRetriesExceeded");
        assert_eq!(quarantined[0]["payload"]["k"], "v");
    }

    #[tokio::test]
    async fn fail_always_blocks_until_cleared() {
        let bus = InMemoryBusPublisher::new(5, "dead-letter");
        bus.fail_always(true);
        assert!(matches!(bus.publish(&row(0)).await, PublishOutcome::Retry(_)));

        bus.fail_always(false);
        assert_eq!(bus.publish(&row(0)).await, PublishOutcome::Delivered);
    }
}
