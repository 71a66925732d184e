//! Command and reaction handlers for the order domain.

mod cancel_on_user_inactivated;
mod create_order;
mod update_order_status;

pub use cancel_on_user_inactivated::CancelOrdersOnUserInactivated;
pub use create_order::{CreateOrderCommand, CreateOrderHandler};
pub use update_order_status::{UpdateOrderStatusCommand, UpdateOrderStatusHandler};
