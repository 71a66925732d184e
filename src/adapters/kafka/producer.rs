//! Kafka producer implementation of BusPublisher.
//!
//! Built on rdkafka's `FutureProducer` with `acks=all`: Delivered means
//! every in-sync replica acknowledged the record. The producer is costly to
//! construct and internally thread-safe; construct one per process and
//! share it behind an `Arc`.

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::util::Timeout;
use std::time::Duration;

use crate::config::{BusConfig, OutboxConfig};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{
    BusPublisher, DeadLetterEnvelope, OutboxRow, PublishOutcome, DEAD_LETTER_REASON,
};

/// Kafka-protocol implementation of `BusPublisher`.
pub struct KafkaBusPublisher {
    producer: FutureProducer,
    dead_letter_topic: String,
    max_retries: u32,
    timeout: Duration,
}

impl KafkaBusPublisher {
    /// Creates the process-wide producer.
    pub fn new(bus: &BusConfig, outbox: &OutboxConfig) -> Result<Self, DomainError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &bus.bootstrap_endpoints)
            .set("acks", "all")
            .set("message.timeout.ms", bus.produce_timeout_ms.to_string())
            .create()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::BusError,
                    format!("Failed to create bus producer: {}", e),
                )
            })?;

        tracing::info!(
            brokers = %bus.bootstrap_endpoints,
            dead_letter_topic = %bus.dead_letter_topic,
            "Bus producer created"
        );

        Ok(Self {
            producer,
            dead_letter_topic: bus.dead_letter_topic.clone(),
            max_retries: outbox.max_retries,
            timeout: Duration::from_millis(bus.produce_timeout_ms),
        })
    }

    async fn send(&self, topic: &str, key: &str, payload: Vec<u8>) -> Result<(), KafkaError> {
        let record = FutureRecord::to(topic).payload(&payload).key(key);

        match self.producer.send(record, Timeout::After(self.timeout)).await {
            Ok((partition, offset)) => {
                tracing::debug!(topic, partition, offset, "Record delivered");
                Ok(())
            }
            Err((err, _unsent)) => Err(err),
        }
    }

    /// Quarantines an exhausted row. Permanent either way: the drainer must
    /// seal the row to stop the retry cycle.
    async fn dead_letter(&self, row: &OutboxRow) -> PublishOutcome {
        let envelope = DeadLetterEnvelope::for_row(row);
        let payload = match serde_json::to_vec(&envelope) {
            Ok(bytes) => bytes,
            Err(e) => {
                return PublishOutcome::Failed(format!(
                    "{}; dead-letter envelope unserializable: {}",
                    DEAD_LETTER_REASON, e
                ));
            }
        };

        match self
            .send(&self.dead_letter_topic, &row.aggregate_id, payload)
            .await
        {
            Ok(()) => {
                tracing::warn!(
                    row_id = %row.id,
                    event_type = %row.event_type,
                    retry_count = row.retry_count,
                    "Row quarantined to dead-letter topic"
                );
                PublishOutcome::Failed(DEAD_LETTER_REASON.to_string())
            }
            Err(e) => PublishOutcome::Failed(format!(
                "{}; dead-letter publish failed: {}",
                DEAD_LETTER_REASON, e
            )),
        }
    }
}

#[async_trait]
impl BusPublisher for KafkaBusPublisher {
    async fn publish(&self, row: &OutboxRow) -> PublishOutcome {
        if row.retry_count >= self.max_retries {
            return self.dead_letter(row).await;
        }

        let payload = row.payload.to_string().into_bytes();
        match self.send(&row.event_type, &row.aggregate_id, payload).await {
            Ok(()) => PublishOutcome::Delivered,
            Err(e) => classify(&e),
        }
    }

    async fn flush(&self, grace: Duration) {
        if let Err(e) = self.producer.flush(Timeout::After(grace)) {
            tracing::warn!(error = %e, "Producer flush did not complete within grace");
        }
    }
}

/// Produce errors are transient unless the payload itself can never be
/// accepted; the retry cap handles everything else.
fn classify(err: &KafkaError) -> PublishOutcome {
    match err.rdkafka_error_code() {
        Some(RDKafkaErrorCode::MessageSizeTooLarge) | Some(RDKafkaErrorCode::InvalidMessage) => {
            PublishOutcome::Failed(err.to_string())
        }
        _ => PublishOutcome::Retry(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_messages_classify_as_permanent() {
        let err = KafkaError::MessageProduction(RDKafkaErrorCode::MessageSizeTooLarge);
        assert!(matches!(classify(&err), PublishOutcome::Failed(_)));
    }

    #[test]
    fn broker_trouble_classifies_as_transient() {
        for code in [
            RDKafkaErrorCode::BrokerTransportFailure,
            RDKafkaErrorCode::AllBrokersDown,
            RDKafkaErrorCode::RequestTimedOut,
        ] {
            let err = KafkaError::MessageProduction(code);
            assert!(
                matches!(classify(&err), PublishOutcome::Retry(_)),
                "{code:?} should be transient"
            );
        }
    }
}
