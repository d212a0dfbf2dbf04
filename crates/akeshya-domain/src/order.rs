//! Order lifecycle types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
///
/// Wire format: upper-case name (`"PENDING"`, `"SHIPPED"`, ...). Stored the same way.
/// Any status may be set from any other; only cancellation has guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Refunded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Orders that still count towards revenue (not cancelled or refunded).
    pub fn is_billable(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Refunded)
    }

    /// Placed but not yet delivered.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Confirmed | Self::Processing | Self::Shipped
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOrderStatus(s.to_owned()))
    }
}

/// Prefix of every generated order number.
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

/// Build an order number from a creation instant in epoch milliseconds.
///
/// Two orders created in the same millisecond get the same number. The column is
/// unique, so order creation retries with the next millisecond value.
pub fn order_number_from_millis(epoch_millis: i64) -> String {
    format!("{ORDER_NUMBER_PREFIX}{epoch_millis}")
}
