//! In-memory user store for tests and single-process demos.
//!
//! Shares an `InMemoryOutboxStore` so the "domain row + outbox row" pairing
//! lands in the same place the drainer reads from.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::User;
use crate::ports::{OutboxRow, UserStore};

use super::InMemoryOutboxStore;

/// In-memory implementation of `UserStore`.
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
    outbox: Arc<InMemoryOutboxStore>,
}

impl InMemoryUserStore {
    /// Creates an empty store writing events into the given outbox.
    pub fn new(outbox: Arc<InMemoryOutboxStore>) -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            outbox,
        }
    }

    /// Seeds a user without producing an outbox row (test setup).
    pub async fn seed(&self, user: User) {
        self.users.lock().await.push(user);
    }

    /// Number of stored users.
    pub async fn count(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &User, event: OutboxRow) -> Result<(), DomainError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email() == user.email()) {
            return Err(DomainError::new(
                ErrorCode::DuplicateEmail,
                format!("Email '{}' is already registered", user.email()),
            ));
        }
        users.push(user.clone());
        self.outbox.append(event).await;
        Ok(())
    }

    async fn update_status(
        &self,
        user: &User,
        event: Option<OutboxRow>,
    ) -> Result<(), DomainError> {
        let mut users = self.users.lock().await;
        let slot = users
            .iter_mut()
            .find(|u| u.id() == user.id())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::UserNotFound,
                    format!("User not found: {}", user.id()),
                )
            })?;
        *slot = user.clone();
        if let Some(row) = event {
            self.outbox.append(row).await;
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.lock().await.iter().find(|u| u.id() == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.email() == email)
            .cloned())
    }
}
