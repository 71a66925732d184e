//! HTTP adapters: axum routers, DTOs, and error mapping.

pub mod error;
pub mod orders;
pub mod outbox;
mod user_directory;
pub mod users;

pub use user_directory::HttpUserDirectory;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::time::Duration;

use crate::adapters::websocket::{ws_routes, RelayFeed};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::Cancellation;

/// Upper bound on a save once the request reached a command handler.
/// Client disconnects do not cancel the work; this watchdog does.
pub(crate) const SAVE_WATCHDOG: Duration = Duration::from_secs(15);

/// Runs command work on a detached task so a dropped connection cannot tear
/// a half-finished "domain row + outbox row" pair.
///
/// The work receives a `Cancellation` derived from the request itself: the
/// guard lives in this (connection-bound) future, so a client disconnect
/// drops it and fires the signal. Handlers react only at safe points; the
/// save is bounded by the watchdog, never by the caller.
pub(crate) async fn guarded<T, F, Fut>(work: F) -> Result<T, DomainError>
where
    F: FnOnce(Cancellation) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
    T: Send + 'static,
{
    let (guard, cancel) = Cancellation::pair();
    let task = tokio::spawn(async move { tokio::time::timeout(SAVE_WATCHDOG, work(cancel)).await });
    let result = match task.await {
        Ok(Ok(result)) => result,
        Ok(Err(_elapsed)) => Err(DomainError::new(
            ErrorCode::InternalError,
            "Save exceeded the watchdog window",
        )),
        Err(e) => Err(DomainError::new(
            ErrorCode::InternalError,
            format!("Command task failed: {}", e),
        )),
    };
    // Still here: the caller never went away.
    guard.disarm();
    result
}

/// Assembles the full API surface.
pub fn api_router(
    users: users::UserAppState,
    orders: orders::OrderAppState,
    outbox: outbox::OutboxAppState,
    relay: RelayFeed,
) -> Router {
    Router::new()
        .nest("/api/users", users::user_routes(users))
        .nest("/api/orders", orders::order_routes(orders))
        .nest("/api/outbox", outbox::outbox_routes(outbox))
        .merge(ws_routes(relay))
        .route("/health", get(|| async { StatusCode::OK }))
}
