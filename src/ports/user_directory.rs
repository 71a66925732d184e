//! UserDirectory port - Read-only probe of the peer user service.
//!
//! Order creation confirms the owning user exists and is Active before any
//! local write. The probe is the only synchronous dependency between the
//! two services; everything else flows through the bus.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

use super::Cancellation;

/// What the peer service reported about a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserProbe {
    /// The user exists and is Active.
    Active,
    /// The user exists but is not Active.
    Inactive,
    /// The peer service does not know the user.
    NotFound,
}

/// Port for the synchronous existence probe.
///
/// Implementations return `Err(PeerUnavailable)` on 5xx or network failure
/// and `Err(Cancelled)` when the cancellation signal fires mid-probe.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Probes the peer service for the given user, racing the caller's
    /// cancellation signal.
    async fn probe(
        &self,
        user_id: &UserId,
        cancel: &Cancellation,
    ) -> Result<UserProbe, DomainError>;
}
