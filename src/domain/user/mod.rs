//! User aggregate and its lifecycle.

mod events;

pub use events::{UserCreated, UserStatusChanged};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{EventId, Timestamp, UserId, ValidationError};

/// Lifecycle status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    /// Parses a status string as supplied over HTTP or the wire.
    ///
    /// Accepts the canonical variant name and its lowercase form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" | "active" => Some(UserStatus::Active),
            "Inactive" | "inactive" => Some(UserStatus::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
        };
        write!(f, "{}", s)
    }
}

/// A registered user. Users are created Active and never deleted; the only
/// mutable piece of state is the lifecycle status.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    status: UserStatus,
    created_at: Timestamp,
}

impl User {
    /// Creates a new Active user after validating name and email shape.
    ///
    /// Email uniqueness is a store concern and checked at persistence time.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let email = email.into();

        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        validate_email(&email)?;

        Ok(Self {
            id: UserId::new(),
            name,
            email,
            status: UserStatus::Active,
            created_at: Timestamp::now(),
        })
    }

    /// Restores a user from persisted state.
    pub fn from_parts(
        id: UserId,
        name: String,
        email: String,
        status: UserStatus,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            email,
            status,
            created_at,
        }
    }

    /// Transitions the user to a new status.
    ///
    /// Returns the resulting event, or `None` when the target equals the
    /// current status (a no-op that must not produce an outbox row).
    pub fn change_status(
        &mut self,
        target: UserStatus,
        reason: Option<String>,
    ) -> Option<UserStatusChanged> {
        if self.status == target {
            return None;
        }
        let old_status = self.status;
        self.status = target;

        Some(UserStatusChanged {
            event_id: EventId::new(),
            occurred_at: Timestamp::now(),
            user_id: self.id,
            old_status,
            new_status: target,
            reason,
        })
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}

/// Syntactic email check: one '@' with a non-empty local part and a domain
/// containing a dot.
fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::empty_field("email"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::invalid_format("email", "missing @ symbol"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.starts_with('.') {
        return Err(ValidationError::invalid_format(
            "email",
            "malformed address",
        ));
    }
    Ok(())
}
