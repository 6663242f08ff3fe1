//! Remote document store seam.
//!
//! The remote store is a consumed capability, not something this crate
//! reimplements: it delivers a *complete* snapshot of a collection on every
//! change and accepts create/update/delete calls keyed by collection name.
//!
//! # Implementations
//!
//! - [`RestRemoteStore`] - JSON REST writes plus a server-sent-events watch
//!   stream per collection
//! - [`MemoryRemoteStore`] - in-memory store used by tests and local
//!   development

mod memory;
mod rest;

pub use memory::MemoryRemoteStore;
pub use rest::RestRemoteStore;

use market_lane_core::{CollectionKind, DocumentId};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur when talking to the remote store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Store returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single document as delivered by the store: an id plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier.
    pub id: DocumentId,
    /// The document's fields, verbatim from the store.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create a document from an id and its fields.
    #[must_use]
    pub fn new(id: impl Into<DocumentId>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Read a string field, if present and a string.
    #[must_use]
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Decode into a typed entity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Parse`] when the fields do not match the
    /// entity's shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// The entire current contents of a collection, re-sent on every change.
///
/// Insertion order is as received from the store, not necessarily creation
/// order. A snapshot always fully supersedes the previous one; it is never
/// a diff.
pub type Snapshot = Vec<Document>;

/// Receiving half of a collection's snapshot stream.
///
/// Dropping the receiver releases the underlying stream.
pub type SnapshotReceiver = mpsc::UnboundedReceiver<Snapshot>;

/// Client capability of the remote document store.
///
/// All methods are single remote calls; retry and reconnection policy for
/// the watch streams belongs to the implementation, never to callers.
#[allow(async_fn_in_trait)]
pub trait RemoteStore: Send + Sync + 'static {
    /// Open a long-lived snapshot stream for one collection.
    ///
    /// The current snapshot is delivered immediately, then one snapshot per
    /// remote change. Transient stream failures are handled inside the
    /// implementation; the receiver simply goes quiet until reconnected.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the stream cannot be established.
    async fn subscribe(&self, kind: CollectionKind) -> Result<SnapshotReceiver, StoreError>;

    /// Create a document; the store assigns and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects or fails the write.
    async fn create(
        &self,
        kind: CollectionKind,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, StoreError>;

    /// Update a subset of an existing document's fields.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects or fails the write.
    async fn update(
        &self,
        kind: CollectionKind,
        id: &DocumentId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects or fails the delete.
    async fn delete(&self, kind: CollectionKind, id: &DocumentId) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use market_lane_core::Category;

    use super::*;

    #[test]
    fn test_document_fields_flatten_on_the_wire() {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String("Shoes".to_string()));

        let doc = Document::new("cat-1", fields);
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["id"], "cat-1");
        assert_eq!(value["name"], "Shoes");
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn test_document_decodes_into_entity() {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String("Shoes".to_string()));
        fields.insert(
            "imageUrl".to_string(),
            Value::String("https://host/shoes.png".to_string()),
        );

        let doc = Document::new("cat-1", fields);
        let category: Category = doc.decode().unwrap();
        assert_eq!(category.name, "Shoes");
        assert_eq!(category.image_url, "https://host/shoes.png");
    }

    #[test]
    fn test_document_decode_rejects_wrong_shape() {
        let doc = Document::new("cat-1", Map::new());
        assert!(doc.decode::<Category>().is_err());
    }

    #[test]
    fn test_field_str() {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String("Shoes".to_string()));
        fields.insert("count".to_string(), Value::from(3));

        let doc = Document::new("cat-1", fields);
        assert_eq!(doc.field_str("name"), Some("Shoes"));
        assert_eq!(doc.field_str("count"), None);
        assert_eq!(doc.field_str("missing"), None);
    }
}
