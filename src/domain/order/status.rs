//! OrderStatus enum for tracking order lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an order.
///
/// Cancelled and Expired are terminal. An order enters Expired only from a
/// payment-pending state ({PendingPayment, Ready}) once its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    PendingPayment,
    Ready,
    Completed,
    Cancelled,
    Expired,
}

/// States in which a cascade cancellation may still take hold.
pub const CANCELLABLE: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::PendingPayment,
    OrderStatus::Ready,
];

/// States the expiry scanner transitions to Expired.
pub const EXPIRABLE: &[OrderStatus] = &[OrderStatus::PendingPayment, OrderStatus::Ready];

impl OrderStatus {
    /// Parses a status string as supplied over HTTP.
    ///
    /// Accepts the canonical variant name and its snake_case form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" | "pending" => Some(OrderStatus::Pending),
            "PendingPayment" | "pending_payment" => Some(OrderStatus::PendingPayment),
            "Ready" | "ready" => Some(OrderStatus::Ready),
            "Completed" | "completed" => Some(OrderStatus::Completed),
            "Cancelled" | "cancelled" => Some(OrderStatus::Cancelled),
            "Expired" | "expired" => Some(OrderStatus::Expired),
            _ => None,
        }
    }

    /// Returns true if a cascade cancellation may still apply.
    pub fn is_cancellable(&self) -> bool {
        CANCELLABLE.contains(self)
    }

    /// Returns true if the expiry deadline applies in this state.
    pub fn is_expirable(&self) -> bool {
        EXPIRABLE.contains(self)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::PendingPayment => "PendingPayment",
            OrderStatus::Ready => "Ready",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Expired => "Expired",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn parse_accepts_both_spellings() {
        assert_eq!(
            OrderStatus::parse("PendingPayment"),
            Some(OrderStatus::PendingPayment)
        );
        assert_eq!(
            OrderStatus::parse("pending_payment"),
            Some(OrderStatus::PendingPayment)
        );
        assert_eq!(OrderStatus::parse("cancelled"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("Paid"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn cancellable_states_are_the_open_ones() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::PendingPayment.is_cancellable());
        assert!(OrderStatus::Ready.is_cancellable());
        assert!(!OrderStatus::Completed.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
        assert!(!OrderStatus::Expired.is_cancellable());
    }

    #[test]
    fn expirable_states_are_the_payment_pending_ones() {
        assert!(OrderStatus::PendingPayment.is_expirable());
        assert!(OrderStatus::Ready.is_expirable());
        assert!(!OrderStatus::Pending.is_expirable());
        assert!(!OrderStatus::Completed.is_expirable());
    }

    #[test]
    fn display_matches_variant_name() {
        assert_eq!(OrderStatus::PendingPayment.to_string(), "PendingPayment");
    }

    #[test]
    fn serializes_as_variant_name() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PendingPayment).unwrap(),
            "\"PendingPayment\""
        );
    }
}
