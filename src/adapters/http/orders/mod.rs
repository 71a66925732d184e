//! Order HTTP surface.

mod dto;
mod handlers;
mod routes;

pub use dto::{CreateOrderRequest, OrderResponse, UpdateOrderStatusRequest};
pub use handlers::OrderAppState;
pub use routes::order_routes;
