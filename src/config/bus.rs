//! Message bus configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Kafka-protocol bus configuration shared by producer, consumer, and relay.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Comma-separated broker addresses
    #[serde(default = "default_bootstrap_endpoints")]
    pub bootstrap_endpoints: String,

    /// Consumer group for the cross-service consumer
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,

    /// Topics the cross-service consumer subscribes to
    #[serde(default = "default_subscribed_topics")]
    pub subscribed_topics: Vec<String>,

    /// Consumer group for the websocket fan-out relay
    #[serde(default = "default_relay_consumer_group")]
    pub relay_consumer_group: String,

    /// Quarantine topic for events the publisher has given up on
    #[serde(default = "default_dead_letter_topic")]
    pub dead_letter_topic: String,

    /// Producer send timeout in milliseconds
    #[serde(default = "default_produce_timeout_ms")]
    pub produce_timeout_ms: u64,
}

impl BusConfig {
    /// Validate bus configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bootstrap_endpoints.trim().is_empty() {
            return Err(ValidationError::EmptyBootstrapEndpoints);
        }
        if self.consumer_group.trim().is_empty() || self.relay_consumer_group.trim().is_empty() {
            return Err(ValidationError::EmptyConsumerGroup);
        }
        Ok(())
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            bootstrap_endpoints: default_bootstrap_endpoints(),
            consumer_group: default_consumer_group(),
            subscribed_topics: default_subscribed_topics(),
            relay_consumer_group: default_relay_consumer_group(),
            dead_letter_topic: default_dead_letter_topic(),
            produce_timeout_ms: default_produce_timeout_ms(),
        }
    }
}

fn default_bootstrap_endpoints() -> String {
    "localhost:9092".to_string()
}

fn default_consumer_group() -> String {
    "storefront-orders".to_string()
}

fn default_subscribed_topics() -> Vec<String> {
    vec!["users.status-changed".to_string()]
}

fn default_relay_consumer_group() -> String {
    "storefront-relay".to_string()
}

fn default_dead_letter_topic() -> String {
    "dead-letter".to_string()
}

fn default_produce_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_subscribe_to_user_status_changes() {
        let config = BusConfig::default();
        assert_eq!(config.subscribed_topics, vec!["users.status-changed"]);
        assert_eq!(config.dead_letter_topic, "dead-letter");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_brokers_fail_validation() {
        let config = BusConfig {
            bootstrap_endpoints: " ".to_string(),
            ..BusConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::EmptyBootstrapEndpoints)
        );
    }

    #[test]
    fn empty_group_fails_validation() {
        let config = BusConfig {
            consumer_group: "".to_string(),
            ..BusConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyConsumerGroup));
    }
}
