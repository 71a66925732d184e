//! Outbox drainer configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the outbox drainer and its retry policy.
#[derive(Debug, Clone, Deserialize)]
pub struct OutboxConfig {
    /// How often the drainer polls for pending rows, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum rows acquired per drain cycle
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// How long an acquired row stays invisible to other drainers, in seconds
    #[serde(default = "default_lock_duration_seconds")]
    pub lock_duration_seconds: u64,

    /// Retry cap; once reached, the next attempt goes to the dead-letter topic
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Producer flush grace on shutdown, in seconds
    #[serde(default = "default_flush_grace_seconds")]
    pub flush_grace_seconds: u64,
}

impl OutboxConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn lock_duration(&self) -> Duration {
        Duration::from_secs(self.lock_duration_seconds)
    }

    pub fn flush_grace(&self) -> Duration {
        Duration::from_secs(self.flush_grace_seconds)
    }

    /// Validate outbox configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 || self.batch_size > 10_000 {
            return Err(ValidationError::InvalidBatchSize);
        }
        if self.lock_duration_seconds == 0 {
            return Err(ValidationError::InvalidLockDuration);
        }
        Ok(())
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
            lock_duration_seconds: default_lock_duration_seconds(),
            max_retries: default_max_retries(),
            flush_grace_seconds: default_flush_grace_seconds(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_batch_size() -> u32 {
    100
}

fn default_lock_duration_seconds() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    5
}

fn default_flush_grace_seconds() -> u64 {
    5
}
