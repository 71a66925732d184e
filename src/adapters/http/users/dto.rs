//! Request and response DTOs for user endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;
use crate::domain::user::{User, UserStatus};

/// Body of POST /api/users.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Body of PATCH /api/users/:id/status.
#[derive(Debug, Deserialize)]
pub struct ChangeUserStatusRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Public user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            status: user.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_tolerates_missing_fields() {
        let req: CreateUserRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.name.is_empty());
        assert!(req.email.is_empty());
    }

    #[test]
    fn response_reflects_the_user() {
        let user = User::new("Alice", "alice@example.com").unwrap();
        let response = UserResponse::from(&user);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["id"], user.id().to_string());
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["status"], "Active");
    }
}
