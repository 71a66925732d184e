//! Background workers feeding on and off the outbox.

mod drainer;
mod expiry;

pub use drainer::{DrainerConfig, OutboxDrainer};
pub use expiry::{ExpiryScanner, ExpiryScannerConfig};
