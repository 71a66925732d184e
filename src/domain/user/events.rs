//! Events emitted by the User aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{topics, EventId, Timestamp, UserId};
use crate::domain_event;

use super::UserStatus;

/// A user was registered. The payload is the public user record.
///
/// This family predates the camelCase contract of the later events and
/// keeps its original PascalCase keys ({"Id","Name","Email"}) on the wire;
/// downstream consumers were built against those bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserCreated {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

domain_event!(
    UserCreated,
    event_type = topics::USERS_CREATED,
    aggregate_id = id
);

/// A user's lifecycle status changed. Consumed by the order domain to
/// cancel open orders when the new status is Inactive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusChanged {
    pub event_id: EventId,
    pub occurred_at: Timestamp,
    pub user_id: UserId,
    pub old_status: UserStatus,
    pub new_status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

domain_event!(
    UserStatusChanged,
    event_type = topics::USERS_STATUS_CHANGED,
    aggregate_id = user_id
);
