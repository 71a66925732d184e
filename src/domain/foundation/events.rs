//! Event infrastructure for domain event publishing.
//!
//! - `EventId` - Unique identifier carried inside event payloads
//! - `DomainEvent` - Trait that all domain events implement
//! - `domain_event!` - Macro to implement DomainEvent with minimal boilerplate
//! - `topics` - The canonical topic names (the event type IS the topic)

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

/// Canonical topic names. The event-type string of an outbox row doubles as
/// the destination topic on the bus.
pub mod topics {
    pub const USERS_CREATED: &str = "users.created";
    pub const USERS_STATUS_CHANGED: &str = "users.status-changed";
    pub const ORDERS_CREATED: &str = "orders.created";
    pub const ORDERS_STATUS_CHANGED: &str = "orders.status-changed";
    pub const ORDERS_CANCELLED: &str = "orders.cancelled";
}

/// Trait that all domain events must implement.
///
/// Provides the contract for routing (the event type is the destination
/// topic) and for partitioning (the aggregate id becomes the record key so
/// per-aggregate order survives on the bus).
pub trait DomainEvent: Serialize {
    /// Returns the event type string (e.g., "users.created").
    fn event_type(&self) -> &'static str;

    /// Returns the ID of the aggregate that emitted this event.
    fn aggregate_id(&self) -> String;

    /// Serializes the event into its wire payload.
    fn to_payload(&self) -> JsonValue {
        serde_json::to_value(self)
            .expect("Event serialization should never fail for well-formed events")
    }
}

/// Macro to implement DomainEvent with minimal boilerplate.
///
/// # Example
///
/// ```ignore
/// domain_event!(UserCreated, event_type = topics::USERS_CREATED, aggregate_id = id);
/// ```
#[macro_export]
macro_rules! domain_event {
    (
        $event_name:ident,
        event_type = $event_type:expr,
        aggregate_id = $agg_id_field:ident
    ) => {
        impl $crate::domain::foundation::DomainEvent for $event_name {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn aggregate_id(&self) -> String {
                self.$agg_id_field.to_string()
            }
        }
    };
}

// Re-export the macro
pub use domain_event;

/// Unique identifier for events, distinct from the outbox row identity.
///
/// Carried inside payloads that need consumer-side deduplication keys.
/// Uses a String internally so any ID format survives serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an EventId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
