//! HTTP routes for order endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{create_order, get_order, update_order_status, OrderAppState};

/// Creates the order router.
pub fn order_routes(state: OrderAppState) -> Router {
    Router::new()
        .route("/", post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/status", patch(update_order_status))
        .with_state(state)
}
