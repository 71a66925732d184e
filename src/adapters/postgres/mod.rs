//! PostgreSQL implementations of the store ports.
//!
//! Every state-changing operation that pairs a domain row with an outbox
//! row runs in a single transaction, so the two commit together or not at
//! all.

mod order_store;
mod outbox_store;
mod user_store;

pub use order_store::PgOrderStore;
pub use outbox_store::PgOutboxStore;
pub use user_store::PgUserStore;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Maps an sqlx error into the domain error taxonomy.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, err))
}

/// Postgres unique-violation SQLSTATE.
pub(crate) const UNIQUE_VIOLATION: &str = "23505";
