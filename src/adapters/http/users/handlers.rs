//! HTTP handlers for user endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::adapters::http::error::{error_response, ErrorResponse};
use crate::adapters::http::guarded;
use crate::application::handlers::users::{
    ChangeUserStatusCommand, ChangeUserStatusHandler, CreateUserCommand, CreateUserHandler,
};
use crate::domain::foundation::UserId;
use crate::ports::UserStore;

use super::dto::{ChangeUserStatusRequest, CreateUserRequest, UserResponse};

/// Application state for user endpoints.
#[derive(Clone)]
pub struct UserAppState {
    pub create: Arc<CreateUserHandler>,
    pub change_status: Arc<ChangeUserStatusHandler>,
    pub users: Arc<dyn UserStore>,
}

/// POST /api/users
///
/// 201 with the created user; 400 validation, 409 duplicate email.
pub async fn create_user(
    State(state): State<UserAppState>,
    Json(request): Json<CreateUserRequest>,
) -> Response {
    let handler = state.create.clone();
    let cmd = CreateUserCommand {
        name: request.name,
        email: request.email,
    };

    match guarded(move |cancel| async move { handler.handle(cmd, &cancel).await }).await {
        Ok(user) => (StatusCode::CREATED, Json(UserResponse::from(&user))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/users/:id
pub async fn get_user(State(state): State<UserAppState>, Path(id): Path<String>) -> Response {
    let Ok(user_id) = id.parse::<UserId>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("User", &id)),
        )
            .into_response();
    };

    match state.users.find_by_id(&user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(UserResponse::from(&user))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("User", &id)),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// PATCH /api/users/:id/status
///
/// 204 on success (including no-ops); 400 unknown status, 404 unknown user.
pub async fn change_user_status(
    State(state): State<UserAppState>,
    Path(id): Path<String>,
    Json(request): Json<ChangeUserStatusRequest>,
) -> Response {
    let Ok(user_id) = id.parse::<UserId>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("User", &id)),
        )
            .into_response();
    };

    let handler = state.change_status.clone();
    let cmd = ChangeUserStatusCommand {
        user_id,
        status: request.status,
        reason: request.reason,
    };

    match guarded(move |cancel| async move { handler.handle(cmd, &cancel).await }).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}
