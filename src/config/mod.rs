//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `STOREFRONT`
//! prefix and `__` as the nesting separator, e.g.
//! `STOREFRONT__BUS__BOOTSTRAP_ENDPOINTS=broker:9092`.

mod bus;
mod database;
mod error;
mod orders;
mod outbox;
mod server;
mod users;

pub use bus::BusConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use orders::OrdersConfig;
pub use outbox::OutboxConfig;
pub use server::ServerConfig;
pub use users::UsersConfig;

use serde::Deserialize;

/// Root application configuration.
///
/// Every key has a default; every key is overridable by environment.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server (host, port, log filter)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection
    #[serde(default = "default_database")]
    pub database: DatabaseConfig,

    /// Bus brokers, consumer groups, topics
    #[serde(default)]
    pub bus: BusConfig,

    /// Drainer polling, locking, and retry policy
    #[serde(default)]
    pub outbox: OutboxConfig,

    /// Peer probe and expiry scanner
    #[serde(default)]
    pub orders: OrdersConfig,

    /// User domain knobs
    #[serde(default)]
    pub users: UsersConfig,
}

fn default_database() -> DatabaseConfig {
    DatabaseConfig {
        url: "postgresql://localhost/storefront".to_string(),
        max_connections: 10,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: default_database(),
            bus: BusConfig::default(),
            outbox: OutboxConfig::default(),
            orders: OrdersConfig::default(),
            users: UsersConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first when present (development), then the
    /// `STOREFRONT__…` environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STOREFRONT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bus.subscribed_topics")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.bus.validate()?;
        self.outbox.validate()?;
        self.orders.validate()?;
        Ok(())
    }
}
