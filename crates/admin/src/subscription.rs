//! Ownership of the live collection subscriptions.
//!
//! The manager holds at most one stream per collection kind and is the
//! sole writer of the [`ReplicaStore`]: every snapshot a stream delivers
//! is forwarded verbatim to [`ReplicaStore::replace`]. Reconnection after
//! a transient stream failure is the store client's concern; from here a
//! broken stream just looks quiet, and readers keep seeing the last good
//! snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use market_lane_core::CollectionKind;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::replica::ReplicaStore;
use crate::store::{RemoteStore, SnapshotReceiver, StoreError};

/// Owns one live subscription per collection kind.
///
/// Subscriptions follow scoped acquisition: acquire on first interest via
/// [`Self::subscribe`], release via [`Self::unsubscribe`] (or wholesale via
/// [`Self::shutdown`]) when the owning view is torn down.
pub struct SubscriptionManager<S> {
    store: Arc<S>,
    replica: Arc<ReplicaStore>,
    active: Mutex<HashMap<CollectionKind, JoinHandle<()>>>,
}

impl<S: RemoteStore> SubscriptionManager<S> {
    /// Create a manager with no active subscriptions.
    pub fn new(store: Arc<S>, replica: Arc<ReplicaStore>) -> Self {
        Self {
            store,
            replica,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Establish the live subscription for one collection.
    ///
    /// Idempotent per kind: calling again while already subscribed is a
    /// no-op that keeps the existing stream, so snapshots are never
    /// double-delivered.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the stream cannot be established.
    pub async fn subscribe(&self, kind: CollectionKind) -> Result<(), StoreError> {
        let mut active = self.active.lock().await;
        if active.contains_key(&kind) {
            tracing::debug!(collection = %kind, "Already subscribed");
            return Ok(());
        }

        let receiver = self.store.subscribe(kind).await?;
        let replica = Arc::clone(&self.replica);
        let task = tokio::spawn(forward_snapshots(kind, receiver, replica));
        active.insert(kind, task);
        tracing::info!(collection = %kind, "Subscription established");
        Ok(())
    }

    /// Release the subscription for one collection.
    ///
    /// Safe to call while a snapshot delivery is in flight: the aborted
    /// task's final write, if any, lands in a replica no one is torn away
    /// from mid-read. Calling without an active subscription is a no-op.
    pub async fn unsubscribe(&self, kind: CollectionKind) {
        if let Some(task) = self.active.lock().await.remove(&kind) {
            task.abort();
            tracing::info!(collection = %kind, "Subscription released");
        }
    }

    /// Whether a subscription for this kind is currently held.
    pub async fn is_subscribed(&self, kind: CollectionKind) -> bool {
        self.active.lock().await.contains_key(&kind)
    }

    /// Release every active subscription.
    pub async fn shutdown(&self) {
        for kind in CollectionKind::ALL {
            self.unsubscribe(kind).await;
        }
    }
}

/// Pipe every delivered snapshot into the replica until the stream closes.
async fn forward_snapshots(
    kind: CollectionKind,
    mut receiver: SnapshotReceiver,
    replica: Arc<ReplicaStore>,
) {
    while let Some(snapshot) = receiver.recv().await {
        replica.replace(kind, snapshot);
    }
    tracing::debug!(collection = %kind, "Snapshot stream closed");
}
