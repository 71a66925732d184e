//! Foundation types shared by both service domains.

mod errors;
mod events;
mod ids;
mod money;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{topics, DomainEvent, EventId};
pub use ids::{OrderId, UserId};
pub use money::Money;
pub use timestamp::Timestamp;
