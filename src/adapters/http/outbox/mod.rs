//! Operational outbox HTTP surface.

mod dto;
mod handlers;
mod routes;

pub use dto::{OutboxRowResponse, UnsentQuery};
pub use handlers::OutboxAppState;
pub use routes::outbox_routes;
