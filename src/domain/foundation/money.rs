//! Money amounts in minor units (cents) to avoid floating point issues.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount stored as integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents.
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly greater than zero.
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}
