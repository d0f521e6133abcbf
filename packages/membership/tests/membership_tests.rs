//! Integration tests for the membership tracker.
//!
//! These walk the flows the command layer drives:
//! 1. Create an event, fill its queue, close it
//! 2. Let memberships expire under the background sweeper
//! 3. Offer in and withdraw from trades

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use membership::{
    CancellationToken, Category, Limits, MembershipError, MembershipStore, Sweeper,
    TrackerConfig, UserId, UserRecord,
};

/// Helper to register a batch of users.
fn store_with_users(ids: &[&str]) -> MembershipStore {
    let store = MembershipStore::new(Limits::default());
    for id in ids {
        store.register(UserId::from(*id)).unwrap();
    }
    store
}

fn queue_ids(record: &UserRecord) -> Vec<&str> {
    record.queues.iter().map(|q| q.event_id.as_str()).collect()
}

#[test]
fn test_event_lifecycle_with_queue() {
    let store = store_with_users(&["host", "a", "b"]);
    let (host, a, b) = (UserId::from("host"), UserId::from("a"), UserId::from("b"));
    let expires = Utc::now() + chrono::Duration::hours(2);

    assert!(store.can_create_event(&host));
    store.add_event(&host, "1001", expires).unwrap();
    assert!(!store.can_create_event(&host));

    store.add_queue("1001", &a, expires).unwrap();
    store.add_queue("2002", &a, expires).unwrap();
    store.add_queue("1001", &b, expires).unwrap();

    // Host closes the event: queue dissolves, unrelated entries stay
    store.remove_event(&host, "1001").unwrap();
    store.remove_all_queue("1001").unwrap();

    assert!(store.record(&host).unwrap().events.is_empty());
    assert_eq!(queue_ids(&store.record(&a).unwrap()), vec!["2002"]);
    assert!(store.record(&b).unwrap().queues.is_empty());
    assert!(store.can_create_event(&host));
}

#[test]
fn test_unregister_from_single_queue() {
    let store = store_with_users(&["a"]);
    let a = UserId::from("a");
    let expires = Utc::now() + chrono::Duration::hours(1);
    store.add_queue("1", &a, expires).unwrap();
    store.add_queue("2", &a, expires).unwrap();
    store.add_queue("3", &a, expires).unwrap();
    assert!(!store.can_join_queue(&a));

    store.remove_queue("2", &a).unwrap();

    assert_eq!(queue_ids(&store.record(&a).unwrap()), vec!["1", "3"]);
    assert!(store.can_join_queue(&a));
}

#[test]
fn test_trade_offer_and_withdraw() {
    let store = store_with_users(&["trader"]);
    let trader = UserId::from("trader");

    store.add_trade(&trader, "4821").unwrap();
    store.add_trade(&trader, "5930").unwrap();
    assert_eq!(
        store.add_trade(&trader, "6044"),
        Err(MembershipError::LimitReached {
            category: Category::Trade,
            limit: 2,
        })
    );

    store.remove_trade(&trader, "4821").unwrap();
    store.add_trade(&trader, "6044").unwrap();

    let trades: Vec<_> = store
        .record(&trader)
        .unwrap()
        .trades
        .into_iter()
        .map(|t| t.trade_id)
        .collect();
    assert_eq!(trades, vec!["5930", "6044"]);
}

#[test]
fn test_record_snapshot_serializes() {
    let store = store_with_users(&["a"]);
    let a = UserId::from("a");
    store.add_trade(&a, "77").unwrap();

    let json = serde_json::to_value(store.record(&a).unwrap()).unwrap();

    assert_eq!(json["trades"][0]["trade_id"], "77");
    assert!(json["events"].as_array().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_background_sweeper_expires_memberships() {
    let config = TrackerConfig {
        sweep_interval: Duration::from_secs(10),
        ..TrackerConfig::default()
    };
    let store = Arc::new(MembershipStore::new(config.limits));
    let host = UserId::from("host");
    store.register(host.clone()).unwrap();
    store
        .add_event(&host, "1", Utc::now() - chrono::Duration::seconds(5))
        .unwrap();
    store.add_trade(&host, "9").unwrap();

    let shutdown = CancellationToken::new();
    let handle = Sweeper::from_config(store.clone(), &config).spawn(shutdown.clone());

    tokio::time::sleep(Duration::from_secs(11)).await;

    let record = store.record(&host).unwrap();
    assert!(record.events.is_empty());
    assert_eq!(record.trades.len(), 1);
    assert!(store.can_create_event(&host));

    shutdown.cancel();
    handle.await.unwrap();
}
