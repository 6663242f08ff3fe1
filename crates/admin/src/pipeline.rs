//! Compound mutations against the remote store.
//!
//! Every operator write goes through here: validation first (zero I/O on
//! failure), then the optional asset upload, then exactly one store write.
//! An upload failure aborts the whole operation before anything reaches
//! the store, so there is never partial visible state.
//!
//! Operations are single-shot and never retried internally; callers get a
//! typed [`MutationError`] and decide what to do. Success is *not*
//! reflected into the local replica here - the effect becomes visible
//! through the next snapshot delivery for the affected collection.

use std::sync::Arc;

use market_lane_core::{CollectionKind, DocumentId, OrderStatus};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::MutationError;
use crate::replica::ReplicaStore;
use crate::store::RemoteStore;
use crate::upload::{AssetFile, AssetUpload};

/// Operator input for creating or editing a product.
///
/// Textual fields arrive as the operator typed them; `price` and
/// `stock_quantity` are parsed (and rejected) here rather than upstream,
/// so the pipeline is independent of any form state.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    /// Existing product to edit, or `None` to create.
    pub id: Option<DocumentId>,
    pub name: String,
    /// Decimal string, e.g. `"49.99"`. Must be non-negative.
    pub price: String,
    pub description: String,
    /// Category *name* (denormalized reference, see `market_lane_core::Product`).
    pub category: String,
    /// Integer string, e.g. `"10"`. Must be non-negative.
    pub stock_quantity: String,
    /// New image to upload, or `None` to carry the existing one forward.
    pub image: Option<AssetFile>,
}

/// Validated product fields, ready to be written.
#[derive(Debug)]
struct ProductDraft {
    name: String,
    price: Decimal,
    description: String,
    category: String,
    stock_quantity: u32,
}

/// Performs every write against the remote store.
pub struct MutationPipeline<S, U> {
    store: Arc<S>,
    uploader: Arc<U>,
    replica: Arc<ReplicaStore>,
}

impl<S: RemoteStore, U: AssetUpload> MutationPipeline<S, U> {
    /// Create a pipeline over a store, an uploader, and the replica it
    /// consults for last-known values.
    pub fn new(store: Arc<S>, uploader: Arc<U>, replica: Arc<ReplicaStore>) -> Self {
        Self {
            store,
            uploader,
            replica,
        }
    }

    /// Create a category.
    ///
    /// The image is a hard precondition: it is uploaded first, and an
    /// upload failure means no category document is ever written.
    ///
    /// # Errors
    ///
    /// [`MutationError::Validation`] for a missing name or image,
    /// [`MutationError::AssetUpload`] when the upload fails (no store
    /// write occurs), [`MutationError::StoreWrite`] when the store rejects
    /// the create.
    #[instrument(skip(self, image), fields(name = %name))]
    pub async fn create_category(
        &self,
        name: &str,
        image: Option<&AssetFile>,
    ) -> Result<DocumentId, MutationError> {
        if name.trim().is_empty() {
            return Err(MutationError::Validation(
                "category name is required".to_string(),
            ));
        }
        let Some(image) = image else {
            return Err(MutationError::Validation(
                "category image is required".to_string(),
            ));
        };

        let asset = self.uploader.upload(image).await?;

        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.trim().to_string()));
        fields.insert("imageUrl".to_string(), Value::String(asset.secure_url));

        let id = self.store.create(CollectionKind::Categories, fields).await?;
        Ok(id)
    }

    /// Delete a category.
    ///
    /// Products referencing the category by name are left untouched; the
    /// stale name is an accepted dangling reference.
    ///
    /// # Errors
    ///
    /// [`MutationError::StoreWrite`] when the store rejects the delete.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &DocumentId) -> Result<(), MutationError> {
        self.store.delete(CollectionKind::Categories, id).await?;
        Ok(())
    }

    /// Create or update a product.
    ///
    /// With a new image, the upload happens first and an upload failure
    /// aborts the whole operation - an existing product keeps its prior
    /// `imageUrl` and every other field untouched. Without a new image,
    /// the last-known `imageUrl` (or `""` for a new product) is carried
    /// forward. Writes exactly the mutable fields; returns the affected id.
    ///
    /// # Errors
    ///
    /// [`MutationError::Validation`] for missing or malformed fields
    /// (before any I/O), [`MutationError::AssetUpload`] on upload failure,
    /// [`MutationError::StoreWrite`] when the store rejects the write.
    #[instrument(skip(self, input), fields(id = ?input.id, name = %input.name))]
    pub async fn save_product(&self, input: ProductInput) -> Result<DocumentId, MutationError> {
        let draft = validate_product(&input)?;

        let image_url = match &input.image {
            Some(file) => self.uploader.upload(file).await?.secure_url,
            None => input
                .id
                .as_ref()
                .and_then(|id| self.replica.find(CollectionKind::Products, id))
                .and_then(|doc| doc.field_str("imageUrl").map(str::to_string))
                .unwrap_or_default(),
        };

        let fields = product_fields(&draft, &image_url);
        match input.id {
            Some(id) => {
                self.store
                    .update(CollectionKind::Products, &id, fields)
                    .await?;
                Ok(id)
            }
            None => {
                let id = self.store.create(CollectionKind::Products, fields).await?;
                Ok(id)
            }
        }
    }

    /// Delete a product unconditionally.
    ///
    /// No dependency check is made against orders that reference it; their
    /// line items keep the purchase-time name and price.
    ///
    /// # Errors
    ///
    /// [`MutationError::StoreWrite`] when the store rejects the delete.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &DocumentId) -> Result<(), MutationError> {
        self.store.delete(CollectionKind::Products, id).await?;
        Ok(())
    }

    /// Set an order's status, leaving every other field untouched.
    ///
    /// `next` is the operator-supplied status token. The last-known status
    /// comes from the replica; an order not yet replicated is treated as
    /// `Pending`, which is also the storefront's initial status.
    ///
    /// # Errors
    ///
    /// [`MutationError::InvalidTransition`] when the token is not a status
    /// or the transition is rejected, [`MutationError::StoreWrite`] when
    /// the store rejects the update.
    #[instrument(skip(self))]
    pub async fn set_order_status(
        &self,
        order_id: &DocumentId,
        next: &str,
    ) -> Result<(), MutationError> {
        let next = next
            .parse::<OrderStatus>()
            .map_err(|e| MutationError::InvalidTransition(e.to_string()))?;

        let current: OrderStatus = self
            .replica
            .find(CollectionKind::Orders, order_id)
            .and_then(|doc| doc.field_str("status").and_then(|s| s.parse().ok()))
            .unwrap_or_default();

        if !current.can_transition(next) {
            return Err(MutationError::InvalidTransition(format!(
                "{current} -> {next}"
            )));
        }

        let mut fields = Map::new();
        fields.insert("status".to_string(), Value::String(next.to_string()));
        self.store
            .update(CollectionKind::Orders, order_id, fields)
            .await?;
        Ok(())
    }
}

fn validate_product(input: &ProductInput) -> Result<ProductDraft, MutationError> {
    let name = required_text(&input.name, "product name")?;
    let description = required_text(&input.description, "product description")?;
    let category = required_text(&input.category, "product category")?;

    let price_text = required_text(&input.price, "product price")?;
    let price: Decimal = price_text
        .parse()
        .map_err(|_| MutationError::Validation("product price must be a number".to_string()))?;
    if price.is_sign_negative() {
        return Err(MutationError::Validation(
            "product price must not be negative".to_string(),
        ));
    }

    let stock_text = required_text(&input.stock_quantity, "stock quantity")?;
    let stock_quantity: u32 = stock_text.parse().map_err(|_| {
        MutationError::Validation("stock quantity must be a non-negative integer".to_string())
    })?;

    Ok(ProductDraft {
        name,
        price,
        description,
        category,
        stock_quantity,
    })
}

fn required_text(value: &str, label: &str) -> Result<String, MutationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MutationError::Validation(format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}

/// Exactly the mutable product fields, in wire shape.
fn product_fields(draft: &ProductDraft, image_url: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("name".to_string(), Value::String(draft.name.clone()));
    fields.insert("price".to_string(), decimal_value(draft.price));
    fields.insert(
        "description".to_string(),
        Value::String(draft.description.clone()),
    );
    fields.insert(
        "category".to_string(),
        Value::String(draft.category.clone()),
    );
    fields.insert("imageUrl".to_string(), Value::String(image_url.to_string()));
    fields.insert(
        "stock_quantity".to_string(),
        Value::from(draft.stock_quantity),
    );
    fields
}

/// A `Decimal` as a JSON number (the store holds numeric prices).
fn decimal_value(value: Decimal) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
