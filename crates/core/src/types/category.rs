//! Catalog category entity.

use serde::{Deserialize, Serialize};

use super::DocumentId;

/// A catalog category.
///
/// Categories are created with an image, deleted explicitly, and never
/// updated in place. Products reference a category by *name*, not by id
/// (see [`super::Product::category`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Store-assigned identifier.
    pub id: DocumentId,
    /// Display name; also the value products reference.
    pub name: String,
    /// URL of the uploaded category image. Set once at creation.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}
