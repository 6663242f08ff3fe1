//! Local, read-only replica of the remote collections.
//!
//! The replica is the only shared mutable state in the admin core. It is
//! written exclusively by the [`crate::subscription::SubscriptionManager`]
//! and read by everyone else; there is no mutation path besides
//! [`ReplicaStore::replace`], so a reader can never observe a partially
//! applied snapshot.

use market_lane_core::{CollectionKind, DocumentId};
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::store::{Document, Snapshot};

/// Per-collection snapshot holder with synchronous change notification.
///
/// Each collection kind is backed by a `watch` channel whose value is the
/// latest full snapshot: [`Self::replace`] supersedes the previous value
/// atomically (never merges) and wakes observers, [`Self::get`] clones the
/// current value, [`Self::watch`] hands out an observer handle.
#[derive(Debug)]
pub struct ReplicaStore {
    products: watch::Sender<Snapshot>,
    categories: watch::Sender<Snapshot>,
    orders: watch::Sender<Snapshot>,
}

impl ReplicaStore {
    /// Create a replica with an empty snapshot per collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: watch::Sender::new(Vec::new()),
            categories: watch::Sender::new(Vec::new()),
            orders: watch::Sender::new(Vec::new()),
        }
    }

    const fn channel(&self, kind: CollectionKind) -> &watch::Sender<Snapshot> {
        match kind {
            CollectionKind::Products => &self.products,
            CollectionKind::Categories => &self.categories,
            CollectionKind::Orders => &self.orders,
        }
    }

    /// Atomically replace the snapshot for one collection.
    ///
    /// The new snapshot fully supersedes the old one; no diffing or merging
    /// is performed. Observers are notified synchronously.
    pub fn replace(&self, kind: CollectionKind, snapshot: Snapshot) {
        tracing::debug!(collection = %kind, documents = snapshot.len(), "Replica replaced");
        self.channel(kind).send_replace(snapshot);
    }

    /// The current snapshot for one collection, insertion order preserved.
    #[must_use]
    pub fn get(&self, kind: CollectionKind) -> Snapshot {
        self.channel(kind).borrow().clone()
    }

    /// An observer handle that resolves whenever the snapshot changes.
    #[must_use]
    pub fn watch(&self, kind: CollectionKind) -> watch::Receiver<Snapshot> {
        self.channel(kind).subscribe()
    }

    /// Find a document by id in the current snapshot.
    #[must_use]
    pub fn find(&self, kind: CollectionKind, id: &DocumentId) -> Option<Document> {
        self.channel(kind)
            .borrow()
            .iter()
            .find(|doc| &doc.id == id)
            .cloned()
    }

    /// Decode the current snapshot into typed entities.
    ///
    /// Documents that do not match the entity shape are skipped with a
    /// warning; a single malformed remote document must not take down the
    /// whole view.
    #[must_use]
    pub fn decode<T: DeserializeOwned>(&self, kind: CollectionKind) -> Vec<T> {
        self.channel(kind)
            .borrow()
            .iter()
            .filter_map(|doc| match doc.decode() {
                Ok(entity) => Some(entity),
                Err(e) => {
                    tracing::warn!(collection = %kind, id = %doc.id, error = %e, "Skipping undecodable document");
                    None
                }
            })
            .collect()
    }
}

impl Default for ReplicaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use market_lane_core::Category;
    use serde_json::{Map, Value};

    use super::*;

    fn doc(id: &str, name: &str) -> Document {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.to_string()));
        fields.insert("imageUrl".to_string(), Value::String(format!("https://host/{name}.png")));
        Document::new(id, fields)
    }

    #[test]
    fn test_starts_empty() {
        let replica = ReplicaStore::new();
        for kind in CollectionKind::ALL {
            assert!(replica.get(kind).is_empty());
        }
    }

    #[test]
    fn test_replace_supersedes_never_merges() {
        let replica = ReplicaStore::new();

        let deliveries = [
            vec![doc("a", "Shoes"), doc("b", "Hats")],
            vec![doc("b", "Hats")],
            vec![doc("c", "Bags")],
        ];

        // After the Nth delivery the replica equals exactly the Nth
        // snapshot - prior contents never leak through.
        for delivery in deliveries {
            replica.replace(CollectionKind::Categories, delivery.clone());
            assert_eq!(replica.get(CollectionKind::Categories), delivery);
        }
    }

    #[test]
    fn test_replace_with_empty_clears() {
        let replica = ReplicaStore::new();
        replica.replace(CollectionKind::Products, vec![doc("a", "Shoes")]);
        replica.replace(CollectionKind::Products, Vec::new());
        assert!(replica.get(CollectionKind::Products).is_empty());
    }

    #[test]
    fn test_collections_are_independent() {
        let replica = ReplicaStore::new();
        replica.replace(CollectionKind::Products, vec![doc("a", "Shoes")]);
        assert!(replica.get(CollectionKind::Categories).is_empty());
        assert!(replica.get(CollectionKind::Orders).is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let replica = ReplicaStore::new();
        replica.replace(
            CollectionKind::Categories,
            vec![doc("a", "Shoes"), doc("b", "Hats")],
        );

        let found = replica.find(CollectionKind::Categories, &DocumentId::new("b"));
        assert_eq!(found.unwrap().field_str("name"), Some("Hats"));
        assert!(replica.find(CollectionKind::Categories, &DocumentId::new("z")).is_none());
    }

    #[test]
    fn test_decode_skips_malformed_documents() {
        let replica = ReplicaStore::new();
        replica.replace(
            CollectionKind::Categories,
            vec![doc("a", "Shoes"), Document::new("broken", Map::new())],
        );

        let categories: Vec<Category> = replica.decode(CollectionKind::Categories);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories.first().unwrap().name, "Shoes");
    }

    #[tokio::test]
    async fn test_watch_observes_replace() {
        let replica = ReplicaStore::new();
        let mut rx = replica.watch(CollectionKind::Orders);

        replica.replace(CollectionKind::Orders, vec![doc("o-1", "ignored")]);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }
}
