//! Customer order entity.
//!
//! Orders are created by the external storefront, never by the admin core.
//! The core reads them and mutates only [`Order::status`]; `items`,
//! `totalPrice`, and `customerInfo` are immutable once created.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DocumentId, OrderStatus};

/// A single line item in an order, priced at time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product id at time of purchase. The product may since have been
    /// deleted; no dependency check is made.
    pub id: DocumentId,
    /// Product name at time of purchase.
    pub name: String,
    /// Units ordered. Positive.
    pub quantity: u32,
    /// Unit price at time of purchase.
    pub price: Decimal,
}

/// Shipping and contact details supplied at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Store-assigned identifier.
    pub id: DocumentId,
    /// Ordered line items.
    pub items: Vec<OrderItem>,
    /// Order total at time of purchase.
    #[serde(rename = "totalPrice")]
    pub total_price: Decimal,
    /// Checkout contact details.
    #[serde(rename = "customerInfo")]
    pub customer_info: CustomerInfo,
    /// Server-assigned creation timestamp.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Current lifecycle status. Defaults to `Pending` for documents
    /// written before the status field existed.
    #[serde(default)]
    pub status: OrderStatus,
}
