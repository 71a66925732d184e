//! ExpiryScanner - Background worker that expires overdue orders.
//!
//! Periodically finds orders still waiting on payment ({PendingPayment,
//! Ready}) whose deadline has passed, transitions them to Expired, and
//! appends one `orders.cancelled` outbox row with reason "timeout" per
//! order, all in one store transaction. A cycle-level error sleeps one
//! poll interval so a broken store cannot produce a tight error loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::config::OrdersConfig;
use crate::domain::foundation::{DomainError, EventId, Timestamp};
use crate::domain::order::{reasons, OrderCancelled, OrderStatus, EXPIRABLE};
use crate::ports::{OrderStore, OrderTransition, OutboxRow};

/// Configuration for the ExpiryScanner worker.
#[derive(Debug, Clone)]
pub struct ExpiryScannerConfig {
    /// How often to scan for overdue orders.
    pub poll_interval: Duration,

    /// Maximum orders expired per cycle.
    pub batch_size: u32,
}

impl Default for ExpiryScannerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            batch_size: 50,
        }
    }
}

impl From<&OrdersConfig> for ExpiryScannerConfig {
    fn from(config: &OrdersConfig) -> Self {
        Self {
            poll_interval: config.expiry_poll_interval(),
            batch_size: config.expiry_batch_size,
        }
    }
}

/// Background worker transitioning overdue orders to Expired.
pub struct ExpiryScanner {
    orders: Arc<dyn OrderStore>,
    config: ExpiryScannerConfig,
}

impl ExpiryScanner {
    /// Creates a scanner with default configuration.
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self {
            orders,
            config: ExpiryScannerConfig::default(),
        }
    }

    /// Creates a scanner with custom configuration.
    pub fn with_config(orders: Arc<dyn OrderStore>, config: ExpiryScannerConfig) -> Self {
        Self { orders, config }
    }

    /// Runs the scan loop until the shutdown signal fires.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Expiry scanner stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    // A full batch means more may be waiting; rescan at once.
                    loop {
                        match self.scan_once().await {
                            Ok(n) if n == self.config.batch_size
                                && !*shutdown.borrow() => continue,
                            Ok(_) => break,
                            Err(e) => {
                                tracing::error!(error = %e, "Expiry scan failed");
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Runs exactly one scan cycle. Returns how many orders were expired.
    pub async fn scan_once(&self) -> Result<u32, DomainError> {
        let now = Timestamp::now();
        let due = self
            .orders
            .list_expired(now, EXPIRABLE, self.config.batch_size)
            .await?;
        if due.is_empty() {
            return Ok(0);
        }

        let changes: Vec<OrderTransition> = due
            .iter()
            .map(|order| OrderTransition {
                order_id: *order.id(),
                expected: EXPIRABLE.to_vec(),
                to: OrderStatus::Expired,
                cancelled_at: None,
                outbox: OutboxRow::for_event(&OrderCancelled {
                    event_id: EventId::new(),
                    occurred_at: now,
                    order_id: *order.id(),
                    user_id: *order.user_id(),
                    reason: reasons::TIMEOUT.to_string(),
                }),
            })
            .collect();

        let expired = self.orders.transition(changes).await?;
        if expired > 0 {
            tracing::info!(expired, "Expired overdue orders");
        }
        Ok(expired)
    }
}
