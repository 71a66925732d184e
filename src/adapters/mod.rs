//! Adapters layer: concrete implementations of the ports.

pub mod events;
pub mod http;
pub mod kafka;
pub mod memory;
pub mod postgres;
pub mod websocket;

pub use events::{DrainerConfig, ExpiryScanner, ExpiryScannerConfig, OutboxDrainer};
pub use http::HttpUserDirectory;
pub use kafka::{BusConsumer, KafkaBusPublisher};
pub use memory::{
    InMemoryBusPublisher, InMemoryOrderStore, InMemoryOutboxStore, InMemoryUserStore,
};
pub use postgres::{PgOrderStore, PgOutboxStore, PgUserStore};
pub use websocket::{RelayBridge, RelayFeed, RelayFrame};
