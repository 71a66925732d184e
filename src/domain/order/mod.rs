//! Order aggregate and its lifecycle.

mod events;
mod status;

pub use events::{reasons, OrderCancelled, OrderCreated, OrderStatusChanged};
pub use status::{OrderStatus, CANCELLABLE, EXPIRABLE};

use crate::domain::foundation::{EventId, Money, OrderId, Timestamp, UserId, ValidationError};

/// An order placed by a user. Quantity and price are strictly positive;
/// the expiry deadline defaults to creation time plus a configured window.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    product: String,
    quantity: u32,
    price: Money,
    status: OrderStatus,
    created_at: Timestamp,
    expires_at: Timestamp,
    cancelled_at: Option<Timestamp>,
}

impl Order {
    /// Creates a new Pending order after validating shape.
    pub fn new(
        user_id: UserId,
        product: impl Into<String>,
        quantity: u32,
        price: Money,
        expires_after_minutes: i64,
    ) -> Result<Self, ValidationError> {
        let product = product.into();
        if product.trim().is_empty() {
            return Err(ValidationError::empty_field("product"));
        }
        if quantity < 1 {
            return Err(ValidationError::below_minimum("quantity", 1, quantity as i64));
        }
        if !price.is_positive() {
            return Err(ValidationError::below_minimum("price", 1, price.cents()));
        }

        let created_at = Timestamp::now();
        Ok(Self {
            id: OrderId::new(),
            user_id,
            product,
            quantity,
            price,
            status: OrderStatus::Pending,
            created_at,
            expires_at: created_at.plus_minutes(expires_after_minutes),
            cancelled_at: None,
        })
    }

    /// Restores an order from persisted state.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: OrderId,
        user_id: UserId,
        product: String,
        quantity: u32,
        price: Money,
        status: OrderStatus,
        created_at: Timestamp,
        expires_at: Timestamp,
        cancelled_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            user_id,
            product,
            quantity,
            price,
            status,
            created_at,
            expires_at,
            cancelled_at,
        }
    }

    /// Transitions the order to a new status.
    ///
    /// Returns the resulting event, or `None` when the target equals the
    /// current status (a no-op that must not produce an outbox row).
    /// A transition into Cancelled records the cancellation time; any other
    /// target clears it.
    pub fn change_status(
        &mut self,
        target: OrderStatus,
        reason: Option<String>,
    ) -> Option<OrderStatusChanged> {
        if self.status == target {
            return None;
        }
        let occurred_at = Timestamp::now();
        let old_status = self.status;
        self.status = target;
        self.cancelled_at = match target {
            OrderStatus::Cancelled => Some(occurred_at),
            _ => None,
        };

        Some(OrderStatusChanged {
            event_id: EventId::new(),
            occurred_at,
            order_id: self.id,
            old_status,
            new_status: target,
            reason,
        })
    }

    /// Applies a store-level transition verbatim. Used by store adapters to
    /// mirror the conditional SQL update; command handlers go through
    /// `change_status` instead.
    pub fn apply_transition(&mut self, to: OrderStatus, cancelled_at: Option<Timestamp>) {
        self.status = to;
        self.cancelled_at = cancelled_at;
    }

    /// True while the order's deadline applies and has passed.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        self.status.is_expirable() && !self.expires_at.is_after(now)
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn expires_at(&self) -> &Timestamp {
        &self.expires_at
    }

    pub fn cancelled_at(&self) -> Option<&Timestamp> {
        self.cancelled_at.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order() -> Order {
        Order::new(UserId::new(), "widget", 2, Money::from_cents(1500), 15).unwrap()
    }

    #[test]
    fn new_order_starts_pending_with_deadline() {
        let order = test_order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.cancelled_at().is_none());
        assert!(order.expires_at().is_after(order.created_at()));
    }

    #[test]
    fn rejects_empty_product() {
        let result = Order::new(UserId::new(), "  ", 1, Money::from_cents(100), 15);
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    #[test]
    fn rejects_zero_quantity() {
        let result = Order::new(UserId::new(), "widget", 0, Money::from_cents(100), 15);
        assert!(matches!(result, Err(ValidationError::BelowMinimum { .. })));
    }

    #[test]
    fn rejects_non_positive_price() {
        assert!(Order::new(UserId::new(), "widget", 1, Money::from_cents(0), 15).is_err());
        assert!(Order::new(UserId::new(), "widget", 1, Money::from_cents(-10), 15).is_err());
    }

    #[test]
    fn change_status_emits_event() {
        let mut order = test_order();
        let event = order
            .change_status(OrderStatus::PendingPayment, None)
            .unwrap();

        assert_eq!(order.status(), OrderStatus::PendingPayment);
        assert_eq!(event.old_status, OrderStatus::Pending);
        assert_eq!(event.new_status, OrderStatus::PendingPayment);
        assert_eq!(event.order_id, *order.id());
    }

    #[test]
    fn change_status_to_current_is_a_noop() {
        let mut order = test_order();
        assert!(order.change_status(OrderStatus::Pending, None).is_none());
    }

    #[test]
    fn cancelling_records_the_cancellation_time() {
        let mut order = test_order();
        let event = order
            .change_status(OrderStatus::Cancelled, Some("customer request".to_string()))
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(order.cancelled_at(), Some(&event.occurred_at));
    }

    #[test]
    fn leaving_cancelled_clears_the_cancellation_time() {
        let mut order = test_order();
        order.change_status(OrderStatus::Cancelled, None).unwrap();
        order.change_status(OrderStatus::Pending, None).unwrap();
        assert!(order.cancelled_at().is_none());
    }

    #[test]
    fn is_expired_at_requires_expirable_state_and_past_deadline() {
        let now = Timestamp::now();
        let mut order = Order::from_parts(
            OrderId::new(),
            UserId::new(),
            "widget".to_string(),
            1,
            Money::from_cents(100),
            OrderStatus::PendingPayment,
            now.minus_minutes(30),
            now.minus_minutes(15),
            None,
        );
        assert!(order.is_expired_at(&now));

        // A Pending order never expires, whatever its deadline says.
        order.change_status(OrderStatus::Pending, None).unwrap();
        assert!(!order.is_expired_at(&now));
    }

    #[test]
    fn future_deadline_does_not_expire() {
        let mut order = test_order();
        order.change_status(OrderStatus::PendingPayment, None).unwrap();
        assert!(!order.is_expired_at(&Timestamp::now()));
    }
}
