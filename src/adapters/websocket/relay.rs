//! RelayBridge - fan-out from the bus to connected websocket clients.
//!
//! The relay subscribes (through its own consumer group) to every core
//! topic plus the dead-letter topic and forwards each record verbatim as
//! `{topic, payload}`. No business logic; a record it cannot parse is
//! forwarded as a raw string rather than dropped.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;

use crate::domain::foundation::{topics, DomainError};
use crate::ports::{BusRecord, EventHandler, EventRouter};

/// Frame pushed to every connected client.
#[derive(Debug, Clone, Serialize)]
pub struct RelayFrame {
    pub topic: String,
    pub payload: JsonValue,
}

/// Everything the relay forwards, minus the configurable dead-letter topic.
pub const CORE_TOPICS: &[&str] = &[
    topics::USERS_CREATED,
    topics::USERS_STATUS_CHANGED,
    topics::ORDERS_CREATED,
    topics::ORDERS_STATUS_CHANGED,
    topics::ORDERS_CANCELLED,
];

/// Bus-side half of the relay: an `EventHandler` feeding a broadcast
/// channel the websocket handler subscribes to.
pub struct RelayBridge {
    feed: broadcast::Sender<RelayFrame>,
}

impl RelayBridge {
    /// Creates a bridge publishing into the given feed.
    pub fn new(feed: broadcast::Sender<RelayFrame>) -> Self {
        Self { feed }
    }

    /// Registers the bridge for every core topic plus the dead-letter topic.
    pub fn register(
        self,
        router: &mut EventRouter,
        dead_letter_topic: &str,
    ) {
        let handler = std::sync::Arc::new(self);
        router.subscribe_all(CORE_TOPICS, handler.clone());
        router.subscribe(dead_letter_topic, handler);
    }
}

#[async_trait]
impl EventHandler for RelayBridge {
    async fn handle(&self, record: &BusRecord) -> Result<(), DomainError> {
        let payload = serde_json::from_slice(&record.payload).unwrap_or_else(|_| {
            JsonValue::String(String::from_utf8_lossy(&record.payload).into_owned())
        });

        // No receivers just means no clients are connected right now.
        let _ = self.feed.send(RelayFrame {
            topic: record.topic.clone(),
            payload,
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "RelayBridge"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn forwards_topic_and_payload() {
        let (tx, mut rx) = broadcast::channel(8);
        let bridge = RelayBridge::new(tx);

        let record = BusRecord::new(
            "users.created",
            None,
            serde_json::to_vec(&json!({"name": "Alice"})).unwrap(),
        );
        bridge.handle(&record).await.unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.topic, "users.created");
        assert_eq!(frame.payload["name"], "Alice");
    }

    #[tokio::test]
    async fn non_json_payloads_are_forwarded_as_strings() {
        let (tx, mut rx) = broadcast::channel(8);
        let bridge = RelayBridge::new(tx);

        let record = BusRecord::new("dead-letter", None, b"not json".to_vec());
        bridge.handle(&record).await.unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.payload, JsonValue::String("not json".to_string()));
    }

    #[tokio::test]
    async fn no_connected_clients_is_not_an_error() {
        let (tx, _) = broadcast::channel(8);
        let bridge = RelayBridge::new(tx);

        let record = BusRecord::new("users.created", None, b"{}".to_vec());
        assert!(bridge.handle(&record).await.is_ok());
    }

    #[test]
    fn register_covers_core_and_dead_letter_topics() {
        let (tx, _) = broadcast::channel(8);
        let mut router = EventRouter::new();
        RelayBridge::new(tx).register(&mut router, "dead-letter");

        let mut expected: Vec<String> =
            CORE_TOPICS.iter().map(ToString::to_string).collect();
        expected.push("dead-letter".to_string());
        expected.sort();
        assert_eq!(router.topics(), expected);
    }
}
