//! ChangeUserStatusHandler - Command handler for user lifecycle changes.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::UserStatus;
use crate::ports::{Cancellation, OutboxRow, UserStore};

/// Command to change a user's lifecycle status. The target arrives as a
/// string from the HTTP surface and is validated here.
#[derive(Debug, Clone)]
pub struct ChangeUserStatusCommand {
    pub user_id: UserId,
    pub status: String,
    pub reason: Option<String>,
}

/// Handler for changing user status.
pub struct ChangeUserStatusHandler {
    users: Arc<dyn UserStore>,
}

impl ChangeUserStatusHandler {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn handle(
        &self,
        cmd: ChangeUserStatusCommand,
        cancel: &Cancellation,
    ) -> Result<(), DomainError> {
        cancel.ensure_active()?;
        let mut user = self
            .users
            .find_by_id(&cmd.user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::UserNotFound,
                    format!("User not found: {}", cmd.user_id),
                )
            })?;

        let target = UserStatus::parse(&cmd.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidStatus,
                format!("Unknown user status '{}'", cmd.status),
            )
        })?;

        match user.change_status(target, cmd.reason) {
            // Same status: succeed without touching the store or the outbox.
            None => Ok(()),
            Some(event) => {
                let row = OutboxRow::for_event(&event);
                self.users.update_status(&user, Some(row)).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryOutboxStore, InMemoryUserStore};
    use crate::domain::user::User;

    async fn seeded() -> (
        ChangeUserStatusHandler,
        Arc<InMemoryUserStore>,
        Arc<InMemoryOutboxStore>,
        UserId,
    ) {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let users = Arc::new(InMemoryUserStore::new(outbox.clone()));
        let user = User::new("Alice", "alice@example.com").unwrap();
        let id = *user.id();
        users.seed(user).await;
        (ChangeUserStatusHandler::new(users.clone()), users, outbox, id)
    }

    fn cmd(user_id: UserId, status: &str) -> ChangeUserStatusCommand {
        ChangeUserStatusCommand {
            user_id,
            status: status.to_string(),
            reason: Some("admin".to_string()),
        }
    }

    #[tokio::test]
    async fn deactivation_updates_user_and_appends_event() {
        let (handler, users, outbox, id) = seeded().await;

        handler.handle(cmd(id, "Inactive"), &Cancellation::never()).await.unwrap();

        let user = users.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(user.status(), UserStatus::Inactive);

        let rows = outbox.rows_of_type("users.status-changed").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].payload["oldStatus"], "Active");
        assert_eq!(rows[0].payload["newStatus"], "Inactive");
        assert_eq!(rows[0].payload["reason"], "admin");
    }

    #[tokio::test]
    async fn noop_change_succeeds_without_outbox_row() {
        let (handler, _, outbox, id) = seeded().await;

        handler.handle(cmd(id, "Active"), &Cancellation::never()).await.unwrap();

        assert!(outbox.rows().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let (handler, _, outbox, id) = seeded().await;

        let err = handler.handle(cmd(id, "Suspended"), &Cancellation::never()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidStatus);
        assert!(outbox.rows().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let (handler, _, _, _) = seeded().await;

        let err = handler.handle(cmd(UserId::new(), "Inactive"), &Cancellation::never()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
