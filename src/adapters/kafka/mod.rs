//! Kafka-protocol bus adapters (rdkafka).

mod consumer;
mod producer;

pub use consumer::BusConsumer;
pub use producer::KafkaBusPublisher;
