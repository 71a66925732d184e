//! UserStore port - Persistence for the User aggregate.
//!
//! Writes that change domain state take the matching outbox row as a
//! parameter so the adapter can commit both in one transaction. A command
//! either leaves a user row plus its event, or nothing at all.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::User;

use super::OutboxRow;

/// Port for persisting users together with their outbox rows.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user and appends its `users.created` row atomically.
    ///
    /// Fails with `DuplicateEmail` when the email is already registered.
    async fn insert(&self, user: &User, event: OutboxRow) -> Result<(), DomainError>;

    /// Persists a status change, appending the outbox row when one was
    /// produced (no-ops pass `None` and write no event).
    async fn update_status(&self, user: &User, event: Option<OutboxRow>)
        -> Result<(), DomainError>;

    /// Looks up a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Looks up a user by email, for the uniqueness precheck.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
}
