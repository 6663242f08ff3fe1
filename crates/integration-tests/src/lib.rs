//! Integration tests for Market Lane.
//!
//! The scenarios run the full admin core - subscription manager, replica,
//! mutation pipeline - against the in-memory remote store, so every write
//! becomes visible the same way it does in production: through the next
//! snapshot delivery, never through an optimistic local update.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p market-lane-integration-tests
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use market_lane_admin::replica::ReplicaStore;
use market_lane_admin::store::MemoryRemoteStore;
use market_lane_admin::subscription::SubscriptionManager;
use market_lane_admin::upload::{AssetFile, AssetUpload, UploadError, UploadedAsset};
use market_lane_admin::{MutationPipeline, Snapshot};
use market_lane_core::CollectionKind;
use tokio::sync::watch;

/// How long a scenario waits for a snapshot before giving up.
pub const PROPAGATION_WAIT: Duration = Duration::from_secs(2);

static TRACING: Once = Once::new();

/// Initialize tracing once per test binary, honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Uploader that answers every upload with a fixed hosted URL.
pub struct RecordingUploader {
    url: String,
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingUploader {
    #[must_use]
    pub fn succeeding(url: &str) -> Self {
        Self {
            url: url.to_string(),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            url: String::new(),
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AssetUpload for RecordingUploader {
    async fn upload(&self, _file: &AssetFile) -> Result<UploadedAsset, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(UploadError::Rejected {
                status: 500,
                message: "asset host unavailable".to_string(),
            });
        }
        Ok(UploadedAsset {
            secure_url: self.url.clone(),
        })
    }
}

/// The fully wired admin core over an in-memory remote store.
pub struct TestContext {
    pub store: Arc<MemoryRemoteStore>,
    pub replica: Arc<ReplicaStore>,
    pub manager: SubscriptionManager<MemoryRemoteStore>,
    pub uploader: Arc<RecordingUploader>,
    pub pipeline: MutationPipeline<MemoryRemoteStore, RecordingUploader>,
}

impl TestContext {
    /// Wire up the core with a succeeding uploader and subscribe to every
    /// collection.
    pub async fn new(hosted_url: &str) -> Self {
        Self::with_uploader(RecordingUploader::succeeding(hosted_url)).await
    }

    /// Wire up the core with a specific uploader and subscribe to every
    /// collection.
    pub async fn with_uploader(uploader: RecordingUploader) -> Self {
        init_tracing();

        let store = Arc::new(MemoryRemoteStore::new());
        let replica = Arc::new(ReplicaStore::new());
        let uploader = Arc::new(uploader);
        let manager = SubscriptionManager::new(Arc::clone(&store), Arc::clone(&replica));
        let pipeline = MutationPipeline::new(
            Arc::clone(&store),
            Arc::clone(&uploader),
            Arc::clone(&replica),
        );

        for kind in CollectionKind::ALL {
            manager
                .subscribe(kind)
                .await
                .unwrap_or_else(|e| panic!("subscribe {kind}: {e}"));
        }

        Self {
            store,
            replica,
            manager,
            uploader,
            pipeline,
        }
    }

    /// Wait until the replica's snapshot for `kind` satisfies `predicate`.
    ///
    /// # Panics
    ///
    /// Panics when the predicate is not satisfied within
    /// [`PROPAGATION_WAIT`] - i.e. the mutation never propagated.
    pub async fn wait_for(
        &self,
        kind: CollectionKind,
        predicate: impl FnMut(&Snapshot) -> bool,
    ) -> Snapshot {
        let mut observer: watch::Receiver<Snapshot> = self.replica.watch(kind);
        let snapshot = tokio::time::timeout(PROPAGATION_WAIT, observer.wait_for(predicate))
            .await
            .unwrap_or_else(|_| panic!("no matching {kind} snapshot within {PROPAGATION_WAIT:?}"))
            .unwrap_or_else(|e| panic!("replica observer closed: {e}"));
        snapshot.clone()
    }
}
