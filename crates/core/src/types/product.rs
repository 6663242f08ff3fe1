//! Catalog product entity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DocumentId;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: DocumentId,
    /// Display name.
    pub name: String,
    /// Unit price. Non-negative.
    pub price: Decimal,
    /// Free-form description.
    pub description: String,
    /// Denormalized category *name*, not an id. Renaming or deleting the
    /// category does not cascade here; the reference may dangle.
    pub category: String,
    /// URL of the uploaded product image, or `""` when no image was ever
    /// supplied. An edit without a new image carries the prior value forward.
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    /// Units in stock. Non-negative.
    #[serde(default)]
    pub stock_quantity: u32,
}
