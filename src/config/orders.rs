//! Order-domain configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for order creation and the expiry scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersConfig {
    /// Base URL of the user service, probed when an order is created
    #[serde(default = "default_peer_service_base_url")]
    pub peer_service_base_url: String,

    /// Minutes until a new order's payment deadline passes
    #[serde(default = "default_order_expiry_minutes")]
    pub order_expiry_default_minutes: i64,

    /// Expiry scanner poll interval, in seconds
    #[serde(default = "default_expiry_poll_seconds")]
    pub expiry_poll_seconds: u64,

    /// Maximum orders the scanner expires per cycle
    #[serde(default = "default_expiry_batch_size")]
    pub expiry_batch_size: u32,

    /// Peer probe request timeout, in seconds
    #[serde(default = "default_peer_timeout_seconds")]
    pub peer_timeout_seconds: u64,
}

impl OrdersConfig {
    pub fn expiry_poll_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_poll_seconds)
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_timeout_seconds)
    }

    /// Validate order configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.peer_service_base_url.starts_with("http://")
            && !self.peer_service_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidPeerUrl);
        }
        if self.order_expiry_default_minutes < 1 {
            return Err(ValidationError::InvalidExpiryWindow);
        }
        Ok(())
    }
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            peer_service_base_url: default_peer_service_base_url(),
            order_expiry_default_minutes: default_order_expiry_minutes(),
            expiry_poll_seconds: default_expiry_poll_seconds(),
            expiry_batch_size: default_expiry_batch_size(),
            peer_timeout_seconds: default_peer_timeout_seconds(),
        }
    }
}

fn default_peer_service_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_order_expiry_minutes() -> i64 {
    15
}

fn default_expiry_poll_seconds() -> u64 {
    5
}

fn default_expiry_batch_size() -> u32 {
    50
}

fn default_peer_timeout_seconds() -> u64 {
    5
}
