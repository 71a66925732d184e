//! OutboxDrainer - Background worker for reliable event delivery.
//!
//! The second half of the Transactional Outbox Pattern:
//! 1. Command handlers write events to the outbox (same transaction as
//!    domain changes)
//! 2. **The drainer acquires pending rows and hands them to the bus
//!    publisher** ← this module
//!
//! Per cycle: acquire a leased batch, publish each row, settle each row.
//! A transient publish failure advances the retry count and leaves the row
//! pending; its lease expiry is what schedules the retry. A permanent
//! failure (including dead-lettered rows) seals the row. One bad row never
//! aborts the cycle.
//!
//! ## Graceful Shutdown
//!
//! On the shutdown signal the drainer finishes the in-flight batch, flushes
//! the producer for a bounded grace, and exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::config::OutboxConfig;
use crate::domain::foundation::DomainError;
use crate::ports::{BusPublisher, OutboxRow, OutboxStore, PublishOutcome};

/// Configuration for the OutboxDrainer worker.
#[derive(Debug, Clone)]
pub struct DrainerConfig {
    /// How often to poll for pending rows.
    pub poll_interval: Duration,

    /// Maximum rows acquired per cycle.
    pub batch_size: u32,

    /// Lease duration for acquired rows.
    pub lock_duration: Duration,

    /// Producer flush grace on shutdown.
    pub flush_grace: Duration,
}

impl Default for DrainerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            batch_size: 100,
            lock_duration: Duration::from_secs(30),
            flush_grace: Duration::from_secs(5),
        }
    }
}

impl From<&OutboxConfig> for DrainerConfig {
    fn from(config: &OutboxConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            batch_size: config.batch_size,
            lock_duration: config.lock_duration(),
            flush_grace: config.flush_grace(),
        }
    }
}

/// Background worker that moves outbox rows onto the bus.
pub struct OutboxDrainer {
    outbox: Arc<dyn OutboxStore>,
    bus: Arc<dyn BusPublisher>,
    config: DrainerConfig,
}

impl OutboxDrainer {
    /// Creates a drainer with default configuration.
    pub fn new(outbox: Arc<dyn OutboxStore>, bus: Arc<dyn BusPublisher>) -> Self {
        Self {
            outbox,
            bus,
            config: DrainerConfig::default(),
        }
    }

    /// Creates a drainer with custom configuration.
    pub fn with_config(
        outbox: Arc<dyn OutboxStore>,
        bus: Arc<dyn BusPublisher>,
        config: DrainerConfig,
    ) -> Self {
        Self {
            outbox,
            bus,
            config,
        }
    }

    /// Runs the drain loop until the shutdown signal fires.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        self.bus.flush(self.config.flush_grace).await;
                        tracing::info!("Outbox drainer stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    // Keep draining while batches come back full, so a
                    // backlog clears without waiting out the poll interval.
                    loop {
                        match self.process_batch().await {
                            Ok(n) if n == self.config.batch_size as usize
                                && !*shutdown.borrow() => continue,
                            Ok(_) => break,
                            Err(e) => {
                                tracing::error!(error = %e, "Drain cycle failed");
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Acquires and processes one batch. Returns how many rows were
    /// attempted.
    pub async fn process_batch(&self) -> Result<usize, DomainError> {
        let rows = self
            .outbox
            .acquire_batch(self.config.batch_size, self.config.lock_duration)
            .await?;

        let count = rows.len();
        for row in rows {
            let outcome = self.bus.publish(&row).await;
            self.settle(&row, outcome).await;
        }
        Ok(count)
    }

    /// Runs exactly one drain cycle (for tests and pull-based operation).
    pub async fn poll_once(&self) -> Result<usize, DomainError> {
        self.process_batch().await
    }

    async fn settle(&self, row: &OutboxRow, outcome: PublishOutcome) {
        let result = match outcome {
            PublishOutcome::Delivered => self.outbox.mark_sent(row.id).await,
            PublishOutcome::Retry(reason) => {
                tracing::warn!(
                    row_id = %row.id,
                    topic = %row.event_type,
                    retry_count = row.retry_count + 1,
                    error = %reason,
                    "Publish failed; row will be retried"
                );
                self.outbox
                    .mark_failed(row.id, row.retry_count + 1, &reason, false)
                    .await
            }
            PublishOutcome::Failed(reason) => {
                tracing::error!(
                    row_id = %row.id,
                    topic = %row.event_type,
                    error = %reason,
                    "Publish failed permanently"
                );
                self.outbox
                    .mark_failed(row.id, row.retry_count + 1, &reason, true)
                    .await
            }
        };

        // A settle failure must not abort the cycle; the lease will expire
        // and the row will be acquired again.
        if let Err(e) = result {
            tracing::error!(row_id = %row.id, error = %e, "Failed to settle outbox row");
        }
    }
}
