//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors raised by semantic validation of loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server port must not be 0")]
    InvalidPort,

    #[error("database url must not be empty")]
    EmptyDatabaseUrl,

    #[error("bus bootstrap endpoints must not be empty")]
    EmptyBootstrapEndpoints,

    #[error("consumer group must not be empty")]
    EmptyConsumerGroup,

    #[error("outbox batch size must be between 1 and 10000")]
    InvalidBatchSize,

    #[error("outbox lock duration must be at least 1 second")]
    InvalidLockDuration,

    #[error("peer service base url must start with http:// or https://")]
    InvalidPeerUrl,

    #[error("order expiry window must be at least 1 minute")]
    InvalidExpiryWindow,
}
