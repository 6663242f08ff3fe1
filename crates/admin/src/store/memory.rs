//! In-memory remote store for tests and local development.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, atomic::AtomicBool, atomic::Ordering};

use market_lane_core::{CollectionKind, DocumentId};
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{Document, RemoteStore, Snapshot, SnapshotReceiver, StoreError};

#[derive(Default)]
struct Inner {
    collections: HashMap<CollectionKind, Vec<Document>>,
    subscribers: HashMap<CollectionKind, Vec<mpsc::UnboundedSender<Snapshot>>>,
}

/// An in-memory [`RemoteStore`] with the same observable semantics as the
/// real store: every change fans the *entire* collection contents out to
/// all live subscribers, and ids are store-assigned.
///
/// Writes can be forced to fail via [`Self::set_fail_writes`] to exercise
/// error paths.
#[derive(Default)]
pub struct MemoryRemoteStore {
    inner: Mutex<Inner>,
    fail_writes: AtomicBool,
}

impl MemoryRemoteStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a collection's contents and notify subscribers.
    pub fn seed(&self, kind: CollectionKind, documents: Vec<Document>) {
        let mut inner = self.lock();
        inner.collections.insert(kind, documents);
        Self::publish(&mut inner, kind);
    }

    /// Current contents of a collection.
    #[must_use]
    pub fn snapshot_of(&self, kind: CollectionKind) -> Snapshot {
        self.lock().collections.get(&kind).cloned().unwrap_or_default()
    }

    /// Number of live subscribers for a collection.
    #[must_use]
    pub fn subscriber_count(&self, kind: CollectionKind) -> usize {
        let mut inner = self.lock();
        let subs = inner.subscribers.entry(kind).or_default();
        subs.retain(|tx| !tx.is_closed());
        subs.len()
    }

    /// Make every subsequent write fail with a 503, for error-path tests.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Status {
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn publish(inner: &mut Inner, kind: CollectionKind) {
        let snapshot = inner.collections.get(&kind).cloned().unwrap_or_default();
        let subs = inner.subscribers.entry(kind).or_default();
        subs.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

impl RemoteStore for MemoryRemoteStore {
    async fn subscribe(&self, kind: CollectionKind) -> Result<SnapshotReceiver, StoreError> {
        let mut inner = self.lock();
        let (tx, rx) = mpsc::unbounded_channel();

        // Initial delivery: the current snapshot, exactly like the real
        // store's watch streams.
        let snapshot = inner.collections.get(&kind).cloned().unwrap_or_default();
        let _ = tx.send(snapshot);

        inner.subscribers.entry(kind).or_default().push(tx);
        Ok(rx)
    }

    async fn create(
        &self,
        kind: CollectionKind,
        fields: Map<String, Value>,
    ) -> Result<DocumentId, StoreError> {
        self.check_writable()?;
        let id = DocumentId::new(Uuid::new_v4().to_string());

        let mut inner = self.lock();
        inner
            .collections
            .entry(kind)
            .or_default()
            .push(Document::new(id.clone(), fields));
        Self::publish(&mut inner, kind);
        Ok(id)
    }

    async fn update(
        &self,
        kind: CollectionKind,
        id: &DocumentId,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut inner = self.lock();

        let Some(doc) = inner
            .collections
            .entry(kind)
            .or_default()
            .iter_mut()
            .find(|doc| &doc.id == id)
        else {
            return Err(StoreError::Status {
                status: 404,
                message: format!("no such document: {kind}/{id}"),
            });
        };

        doc.fields.extend(fields);
        Self::publish(&mut inner, kind);
        Ok(())
    }

    async fn delete(&self, kind: CollectionKind, id: &DocumentId) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut inner = self.lock();
        inner
            .collections
            .entry(kind)
            .or_default()
            .retain(|doc| &doc.id != id);
        Self::publish(&mut inner, kind);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect()
    }

    #[tokio::test]
    async fn test_subscribe_delivers_current_snapshot_immediately() {
        let store = MemoryRemoteStore::new();
        store.seed(
            CollectionKind::Categories,
            vec![Document::new("cat-1", fields(&[("name", "Shoes")]))],
        );

        let mut rx = store.subscribe(CollectionKind::Categories).await.unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.first().unwrap().id.as_str(), "cat-1");
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_publishes_full_snapshot() {
        let store = MemoryRemoteStore::new();
        let mut rx = store.subscribe(CollectionKind::Products).await.unwrap();
        let _initial = rx.recv().await.unwrap();

        let id = store
            .create(CollectionKind::Products, fields(&[("name", "Sneaker")]))
            .await
            .unwrap();

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.first().unwrap().id, id);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryRemoteStore::new();
        store.seed(
            CollectionKind::Products,
            vec![Document::new(
                "prod-1",
                fields(&[("name", "Sneaker"), ("imageUrl", "old.png")]),
            )],
        );

        store
            .update(
                CollectionKind::Products,
                &DocumentId::new("prod-1"),
                fields(&[("name", "Runner")]),
            )
            .await
            .unwrap();

        let snapshot = store.snapshot_of(CollectionKind::Products);
        let doc = snapshot.first().unwrap();
        assert_eq!(doc.field_str("name"), Some("Runner"));
        assert_eq!(doc.field_str("imageUrl"), Some("old.png"));
    }

    #[tokio::test]
    async fn test_update_unknown_document_fails() {
        let store = MemoryRemoteStore::new();
        let err = store
            .update(
                CollectionKind::Products,
                &DocumentId::new("missing"),
                Map::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_and_publishes() {
        let store = MemoryRemoteStore::new();
        store.seed(
            CollectionKind::Categories,
            vec![Document::new("cat-1", fields(&[("name", "Shoes")]))],
        );

        store
            .delete(CollectionKind::Categories, &DocumentId::new("cat-1"))
            .await
            .unwrap();

        assert!(store.snapshot_of(CollectionKind::Categories).is_empty());
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let store = MemoryRemoteStore::new();
        let rx = store.subscribe(CollectionKind::Orders).await.unwrap();
        assert_eq!(store.subscriber_count(CollectionKind::Orders), 1);

        drop(rx);
        assert_eq!(store.subscriber_count(CollectionKind::Orders), 0);
    }

    #[tokio::test]
    async fn test_fail_writes_surfaces_store_error() {
        let store = MemoryRemoteStore::new();
        store.set_fail_writes(true);

        let err = store
            .create(CollectionKind::Products, Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 503, .. }));
    }
}
