//! HTTP handlers for order endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::adapters::http::error::{error_response, ErrorResponse};
use crate::adapters::http::guarded;
use crate::application::handlers::orders::{
    CreateOrderCommand, CreateOrderHandler, UpdateOrderStatusCommand, UpdateOrderStatusHandler,
};
use crate::domain::foundation::{Money, OrderId, UserId, ValidationError};
use crate::ports::OrderStore;

use super::dto::{CreateOrderRequest, OrderResponse, UpdateOrderStatusRequest};

/// Application state for order endpoints.
#[derive(Clone)]
pub struct OrderAppState {
    pub create: Arc<CreateOrderHandler>,
    pub update_status: Arc<UpdateOrderStatusHandler>,
    pub orders: Arc<dyn OrderStore>,
}

/// POST /api/orders
///
/// 201 with the created order; 400 invalid shape or invalid/inactive user,
/// 503 when the user service is unreachable.
pub async fn create_order(
    State(state): State<OrderAppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Response {
    let Ok(user_id) = request.user_id.parse::<UserId>() else {
        return error_response(
            &ValidationError::invalid_format("userId", "not a UUID").into(),
        );
    };
    if request.quantity < 1 {
        return error_response(
            &ValidationError::below_minimum("quantity", 1, request.quantity).into(),
        );
    }

    let handler = state.create.clone();
    let cmd = CreateOrderCommand {
        user_id,
        product: request.product,
        quantity: request.quantity as u32,
        price: Money::from_cents(request.price),
    };

    match guarded(move |cancel| async move { handler.handle(cmd, &cancel).await }).await {
        Ok(order) => (StatusCode::CREATED, Json(OrderResponse::from(&order))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/orders/:id
pub async fn get_order(State(state): State<OrderAppState>, Path(id): Path<String>) -> Response {
    let Ok(order_id) = id.parse::<OrderId>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Order", &id)),
        )
            .into_response();
    };

    match state.orders.find_by_id(&order_id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(OrderResponse::from(&order))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Order", &id)),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// PATCH /api/orders/:id/status
///
/// 204 on success (including no-ops); 400 unknown status, 404 unknown order.
pub async fn update_order_status(
    State(state): State<OrderAppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Response {
    let Ok(order_id) = id.parse::<OrderId>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Order", &id)),
        )
            .into_response();
    };

    let handler = state.update_status.clone();
    let cmd = UpdateOrderStatusCommand {
        order_id,
        status: request.status,
        reason: request.reason,
    };

    match guarded(move |cancel| async move { handler.handle(cmd, &cancel).await }).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}
