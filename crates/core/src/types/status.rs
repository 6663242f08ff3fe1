//! Order status lifecycle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a status token does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

/// Status of a customer order.
///
/// The variants are listed in typical progression order, but the storefront
/// imposes no ordering constraint: an operator may move an order from any
/// status to any other. [`OrderStatus::can_transition`] is the single seam
/// where a stricter lifecycle would be enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in typical progression order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether an order may move from `self` to `next`.
    ///
    /// Every status is currently reachable from every other, including
    /// itself. Invalid status *tokens* are rejected earlier, when parsing
    /// operator input into this enum.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        let _ = next;
        true
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        };
        write!(f, "{s}")
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(UnknownOrderStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_transition_is_allowed() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(from.can_transition(to), "{from} -> {to} should be allowed");
            }
        }
    }

    #[test]
    fn test_backwards_transition_is_allowed() {
        assert!(OrderStatus::Delivered.can_transition(OrderStatus::Pending));
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        assert!("NotAStatus".parse::<OrderStatus>().is_err());
        assert!("pending".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_unknown_token_error_names_the_token() {
        let err = "NotAStatus".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err, UnknownOrderStatus("NotAStatus".to_string()));
        assert_eq!(err.to_string(), "unknown order status: NotAStatus");
    }

    #[test]
    fn test_serde_uses_exact_tokens() {
        let json = serde_json::to_string(&OrderStatus::Shipped).unwrap();
        assert_eq!(json, "\"Shipped\"");
    }
}
