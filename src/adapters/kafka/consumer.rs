//! Kafka consumer driving the cross-service event handlers.
//!
//! One `BusConsumer` owns one rdkafka `StreamConsumer` with a stable
//! consumer group, so partition progress survives restarts. Offsets are
//! committed manually and only after every handler for a record succeeded;
//! a failing handler rewinds the partition so the same record is seen again
//! on the next poll. Undecodable records are committed and skipped; poison
//! messages must not block the partition.

use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::util::Timeout;
use rdkafka::Offset;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::config::BusConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{BusRecord, EventRouter};

const METADATA_TIMEOUT: Duration = Duration::from_secs(3);
const SEEK_TIMEOUT: Duration = Duration::from_secs(2);

/// Long-running consumer task dispatching records to an `EventRouter`.
pub struct BusConsumer {
    consumer: StreamConsumer,
    router: Arc<EventRouter>,
    brokers: String,
    topics: Vec<String>,
    backoff: Duration,
}

impl BusConsumer {
    /// Creates a consumer for the given group over the router's topics.
    pub fn new(
        bus: &BusConfig,
        group: &str,
        router: Arc<EventRouter>,
    ) -> Result<Self, DomainError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &bus.bootstrap_endpoints)
            .set("group.id", group)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::BusError,
                    format!("Failed to create bus consumer: {}", e),
                )
            })?;

        Ok(Self {
            consumer,
            topics: router.topics(),
            router,
            brokers: bus.bootstrap_endpoints.clone(),
            backoff: Duration::from_secs(1),
        })
    }

    /// Startup hardening: wait for brokers, then best-effort creation of
    /// missing subscribed topics (1 partition, RF 1). Gives up after
    /// `attempts` rounds and lets the client recover once topics appear.
    pub async fn ensure_topics(&self, attempts: u32, wait: Duration) {
        for attempt in 1..=attempts {
            let missing = match self.consumer.fetch_metadata(None, METADATA_TIMEOUT) {
                Ok(metadata) => {
                    let existing: HashSet<String> = metadata
                        .topics()
                        .iter()
                        .map(|t| t.name().to_string())
                        .collect();
                    self.topics
                        .iter()
                        .filter(|t| !existing.contains(*t))
                        .cloned()
                        .collect::<Vec<_>>()
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Brokers not reachable yet");
                    tokio::time::sleep(wait).await;
                    continue;
                }
            };

            if missing.is_empty() {
                tracing::info!(topics = ?self.topics, "All subscribed topics present");
                return;
            }

            tracing::info!(?missing, "Creating missing topics");
            if let Err(e) = self.create_topics(&missing).await {
                tracing::warn!(error = %e, "Topic creation attempt failed");
            }
            tokio::time::sleep(wait).await;
        }
        tracing::warn!(
            topics = ?self.topics,
            "Topics still missing after bounded wait; subscribing anyway"
        );
    }

    async fn create_topics(&self, names: &[String]) -> Result<(), DomainError> {
        let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::BusError,
                    format!("Failed to create admin client: {}", e),
                )
            })?;

        let new_topics: Vec<NewTopic> = names
            .iter()
            .map(|name| NewTopic::new(name, 1, TopicReplication::Fixed(1)))
            .collect();

        admin
            .create_topics(new_topics.iter(), &AdminOptions::new())
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::BusError, format!("create_topics failed: {}", e))
            })?;
        Ok(())
    }

    /// Subscribes to every routed topic. Call once before `run`.
    pub fn subscribe(&self) -> Result<(), DomainError> {
        let refs: Vec<&str> = self.topics.iter().map(String::as_str).collect();
        self.consumer.subscribe(&refs).map_err(|e| {
            DomainError::new(
                ErrorCode::BusError,
                format!("Failed to subscribe to {:?}: {}", self.topics, e),
            )
        })?;
        tracing::info!(topics = ?self.topics, "Subscribed");
        Ok(())
    }

    /// Runs the consume loop until the shutdown signal fires.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Bus consumer stopping");
                        return;
                    }
                }
                result = self.consumer.recv() => match result {
                    Ok(message) => self.process(&message).await,
                    Err(e) => {
                        tracing::warn!(error = %e, "Bus receive error");
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
    }

    async fn process(&self, message: &BorrowedMessage<'_>) {
        let payload = message.payload().unwrap_or_default();
        if payload.is_empty() {
            tracing::warn!(
                topic = message.topic(),
                offset = message.offset(),
                "Skipping record with empty payload"
            );
            self.commit(message);
            return;
        }

        let record = BusRecord::new(
            message.topic(),
            message
                .key()
                .map(|k| String::from_utf8_lossy(k).into_owned()),
            payload.to_vec(),
        );

        match self.router.dispatch(&record).await {
            Ok(()) => self.commit(message),
            Err(e) if e.code == ErrorCode::ValidationFailed => {
                // Poison record: the payload will never decode, so retrying
                // would block the partition forever.
                tracing::warn!(
                    topic = message.topic(),
                    offset = message.offset(),
                    error = %e,
                    "Skipping undecodable record"
                );
                self.commit(message);
            }
            Err(e) => {
                tracing::error!(
                    topic = message.topic(),
                    offset = message.offset(),
                    error = %e,
                    "Handler failed; record will be redelivered"
                );
                if let Err(seek_err) = self.consumer.seek(
                    message.topic(),
                    message.partition(),
                    Offset::Offset(message.offset()),
                    Timeout::After(SEEK_TIMEOUT),
                ) {
                    tracing::error!(error = %seek_err, "Failed to rewind partition");
                }
                tokio::time::sleep(self.backoff).await;
            }
        }
    }

    fn commit(&self, message: &BorrowedMessage<'_>) {
        if let Err(e) = self.consumer.commit_message(message, CommitMode::Async) {
            tracing::warn!(error = %e, "Offset commit failed");
        }
    }
}
