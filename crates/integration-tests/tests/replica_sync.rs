//! Replica synchronization scenarios.
//!
//! These verify the snapshot-replace semantics end to end: the replica
//! always equals exactly the last delivered snapshot, subscriptions are
//! idempotent, and releasing a subscription stops delivery without
//! clearing the last good view.

use market_lane_admin::store::Document;
use market_lane_core::CollectionKind;
use market_lane_integration_tests::TestContext;
use serde_json::{Map, Value};

fn doc(id: &str, name: &str) -> Document {
    let mut fields = Map::new();
    fields.insert("name".to_string(), Value::String(name.to_string()));
    Document::new(id, fields)
}

#[tokio::test]
async fn replica_equals_each_delivered_snapshot_in_turn() {
    let ctx = TestContext::new("https://host/unused.png").await;

    let deliveries = [
        vec![doc("a", "Shoes")],
        vec![doc("a", "Shoes"), doc("b", "Hats")],
        vec![doc("b", "Hats")],
        vec![],
        vec![doc("c", "Bags")],
    ];

    for delivery in deliveries {
        ctx.store.seed(CollectionKind::Categories, delivery.clone());
        let snapshot = ctx
            .wait_for(CollectionKind::Categories, |snap| *snap == delivery)
            .await;
        // Exactly the delivered snapshot - nothing merged in from before.
        assert_eq!(snapshot, delivery);
    }
}

#[tokio::test]
async fn double_subscribe_does_not_double_deliver() {
    let ctx = TestContext::new("https://host/unused.png").await;

    // TestContext already subscribed; subscribing again must reuse the
    // existing stream.
    ctx.manager.subscribe(CollectionKind::Products).await.unwrap();
    assert_eq!(ctx.store.subscriber_count(CollectionKind::Products), 1);

    ctx.store.seed(CollectionKind::Products, vec![doc("p-1", "Sneaker")]);
    ctx.wait_for(CollectionKind::Products, |snap| snap.len() == 1).await;
}

#[tokio::test]
async fn unsubscribe_keeps_last_good_snapshot_visible() {
    let ctx = TestContext::new("https://host/unused.png").await;

    ctx.store.seed(CollectionKind::Orders, vec![doc("o-1", "ignored")]);
    ctx.wait_for(CollectionKind::Orders, |snap| snap.len() == 1).await;

    ctx.manager.unsubscribe(CollectionKind::Orders).await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // Remote keeps changing, but the replica freezes at the last snapshot
    // it observed before release.
    ctx.store.seed(CollectionKind::Orders, vec![]);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(ctx.replica.get(CollectionKind::Orders).len(), 1);
}

#[tokio::test]
async fn collection_kinds_are_isolated() {
    let ctx = TestContext::new("https://host/unused.png").await;

    ctx.store.seed(CollectionKind::Products, vec![doc("p-1", "Sneaker")]);
    ctx.wait_for(CollectionKind::Products, |snap| snap.len() == 1).await;

    assert!(ctx.replica.get(CollectionKind::Categories).is_empty());
    assert!(ctx.replica.get(CollectionKind::Orders).is_empty());
}

#[tokio::test]
async fn shutdown_releases_every_stream() {
    let ctx = TestContext::new("https://host/unused.png").await;
    ctx.manager.shutdown().await;

    for kind in CollectionKind::ALL {
        assert!(!ctx.manager.is_subscribed(kind).await);
        assert_eq!(ctx.store.subscriber_count(kind), 0);
    }
}
