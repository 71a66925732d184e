//! CreateUserHandler - Command handler for registering users.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::{User, UserCreated};
use crate::ports::{Cancellation, OutboxRow, UserStore};

/// Command to register a new user.
#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub name: String,
    pub email: String,
}

/// Handler for creating users.
///
/// The user row and its `users.created` outbox row commit in one store
/// transaction: a failed command leaves neither behind.
pub struct CreateUserHandler {
    users: Arc<dyn UserStore>,
}

impl CreateUserHandler {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn handle(
        &self,
        cmd: CreateUserCommand,
        cancel: &Cancellation,
    ) -> Result<User, DomainError> {
        cancel.ensure_active()?;
        let user = User::new(cmd.name, cmd.email)?;

        // Narrow the duplicate window early; the unique index has the final
        // say inside the store transaction.
        if self.users.find_by_email(user.email()).await?.is_some() {
            return Err(DomainError::new(
                ErrorCode::DuplicateEmail,
                format!("Email '{}' is already registered", user.email()),
            ));
        }

        let event = UserCreated {
            id: *user.id(),
            name: user.name().to_string(),
            email: user.email().to_string(),
        };
        self.users.insert(&user, OutboxRow::for_event(&event)).await?;

        Ok(user)
    }
}
