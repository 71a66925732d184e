//! Ports layer: trait seams between the domain and its adapters.

mod bus_publisher;
mod cancellation;
mod event_handler;
mod order_store;
mod outbox_store;
mod user_directory;
mod user_store;

pub use bus_publisher::{
    BusPublisher, DeadLetterEnvelope, PublishOutcome, DEAD_LETTER_REASON,
};
pub use cancellation::{Cancellation, CancellationGuard};
pub use event_handler::{BusRecord, EventHandler, EventRouter};
pub use order_store::{OrderStore, OrderTransition};
pub use outbox_store::{OutboxRow, OutboxStore};
pub use user_directory::{UserDirectory, UserProbe};
pub use user_store::UserStore;
