//! HTTP routes for the operational outbox endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{increment_retry, list_unsent, mark_sent, OutboxAppState};

/// Creates the outbox router.
pub fn outbox_routes(state: OutboxAppState) -> Router {
    Router::new()
        .route("/unsent", get(list_unsent))
        .route("/mark-sent/:id", post(mark_sent))
        .route("/increment-retry/:id", post(increment_retry))
        .with_state(state)
}
