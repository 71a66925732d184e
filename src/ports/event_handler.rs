//! EventHandler port - Interface for reacting to bus records.
//!
//! Handlers register interest in topics through an `EventRouter`; the
//! consumer dispatches each decoded record to every handler registered for
//! its topic and commits the offset only when all of them succeed.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode};

/// A record as read off the bus.
#[derive(Debug, Clone)]
pub struct BusRecord {
    /// Topic the record arrived on (equals the event type)
    pub topic: String,

    /// Partition key, when the producer set one
    pub key: Option<String>,

    /// Raw UTF-8 JSON payload bytes
    pub payload: Vec<u8>,
}

impl BusRecord {
    /// Creates a record from parts.
    pub fn new(topic: impl Into<String>, key: Option<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            key,
            payload,
        }
    }

    /// Decodes the payload into the expected event shape.
    ///
    /// A decode failure is a validation error: the consumer treats it as a
    /// poison record (commit and skip) rather than retrying forever.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        serde_json::from_slice(&self.payload).map_err(|e| {
            DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Undecodable payload on topic '{}': {}", self.topic, e),
            )
        })
    }
}

/// Handler for processing bus records.
///
/// Implementations must be **idempotent under replay**: at-least-once
/// delivery means the same record may arrive any number of times.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Processes one record. Returning an error prevents the offset commit,
    /// so the record is redelivered.
    async fn handle(&self, record: &BusRecord) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Topic-to-handler routing table used by the consumer.
#[derive(Default)]
pub struct EventRouter {
    routes: HashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl EventRouter {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for one topic.
    pub fn subscribe(&mut self, topic: &str, handler: Arc<dyn EventHandler>) {
        self.routes.entry(topic.to_string()).or_default().push(handler);
    }

    /// Registers the same handler for several topics.
    pub fn subscribe_all(&mut self, topics: &[&str], handler: Arc<dyn EventHandler>) {
        for topic in topics {
            self.subscribe(topic, handler.clone());
        }
    }

    /// Returns every topic with at least one handler.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.routes.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Dispatches a record to every handler registered for its topic.
    ///
    /// Handlers run in registration order; the first error aborts the
    /// dispatch so the offset stays uncommitted.
    pub async fn dispatch(&self, record: &BusRecord) -> Result<(), DomainError> {
        let Some(handlers) = self.routes.get(&record.topic) else {
            return Ok(());
        };
        for handler in handlers {
            handler.handle(record).await.map_err(|e| {
                e.with_detail("handler", handler.name())
                    .with_detail("topic", record.topic.clone())
            })?;
        }
        Ok(())
    }
}
