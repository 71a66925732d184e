//! HTTP routes for user endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{change_user_status, create_user, get_user, UserAppState};

/// Creates the user router.
pub fn user_routes(state: UserAppState) -> Router {
    Router::new()
        .route("/", post(create_user))
        .route("/:id", get(get_user))
        .route("/:id/status", patch(change_user_status))
        .with_state(state)
}
