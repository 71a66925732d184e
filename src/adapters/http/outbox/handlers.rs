//! HTTP handlers for the operational outbox endpoints.
//!
//! Retained so a pull-based dispatcher variant stays possible. These are
//! operational endpoints and should be network-restricted in deployment.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::http::error::{error_response, ErrorResponse};
use crate::ports::OutboxStore;

use super::dto::{OutboxRowResponse, UnsentQuery};

/// Application state for outbox endpoints.
#[derive(Clone)]
pub struct OutboxAppState {
    pub outbox: Arc<dyn OutboxStore>,
}

/// GET /api/outbox/unsent?max=N
pub async fn list_unsent(
    State(state): State<OutboxAppState>,
    Query(query): Query<UnsentQuery>,
) -> Response {
    match state.outbox.list_unsent(query.max).await {
        Ok(rows) => {
            let body: Vec<OutboxRowResponse> = rows.iter().map(OutboxRowResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST /api/outbox/mark-sent/:id
pub async fn mark_sent(State(state): State<OutboxAppState>, Path(id): Path<String>) -> Response {
    let Ok(row_id) = id.parse::<Uuid>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Outbox row id must be a UUID")),
        )
            .into_response();
    };

    match state.outbox.mark_sent(row_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/outbox/increment-retry/:id
pub async fn increment_retry(
    State(state): State<OutboxAppState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(row_id) = id.parse::<Uuid>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Outbox row id must be a UUID")),
        )
            .into_response();
    };

    match state.outbox.increment_retry(row_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}
