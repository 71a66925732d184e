//! CreateOrderHandler - Command handler for placing orders.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, Money, UserId};
use crate::domain::order::{Order, OrderCreated};
use crate::ports::{Cancellation, OrderStore, OutboxRow, UserDirectory, UserProbe};

/// Command to place a new order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub user_id: UserId,
    pub product: String,
    pub quantity: u32,
    pub price: Money,
}

/// Handler for creating orders.
///
/// Shape validation comes first, then the synchronous probe of the user
/// service, then the local transaction pairing the order row with its
/// `orders.created` outbox row.
pub struct CreateOrderHandler {
    orders: Arc<dyn OrderStore>,
    directory: Arc<dyn UserDirectory>,
    expiry_minutes: i64,
}

impl CreateOrderHandler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        directory: Arc<dyn UserDirectory>,
        expiry_minutes: i64,
    ) -> Self {
        Self {
            orders,
            directory,
            expiry_minutes,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateOrderCommand,
        cancel: &Cancellation,
    ) -> Result<Order, DomainError> {
        cancel.ensure_active()?;
        let order = Order::new(
            cmd.user_id,
            cmd.product,
            cmd.quantity,
            cmd.price,
            self.expiry_minutes,
        )?;

        match self.directory.probe(&cmd.user_id, cancel).await? {
            UserProbe::Active => {}
            UserProbe::NotFound => {
                return Err(DomainError::new(
                    ErrorCode::InvalidUser,
                    format!("Unknown user: {}", cmd.user_id),
                ));
            }
            UserProbe::Inactive => {
                return Err(DomainError::new(
                    ErrorCode::InvalidUser,
                    format!("User is not active: {}", cmd.user_id),
                ));
            }
        }

        let event = OrderCreated {
            id: *order.id(),
            user_id: *order.user_id(),
            product: order.product().to_string(),
            quantity: order.quantity(),
            price: order.price(),
            status: order.status(),
        };
        self.orders
            .insert(&order, OutboxRow::for_event(&event))
            .await?;

        Ok(order)
    }
}
