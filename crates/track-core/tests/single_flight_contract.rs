//! Contract Test: Single-Flight Serialization
//!
//! Verifies that at most one store-mutating engine operation runs at a
//! time:
//! - A trigger arriving while a refresh is in flight is rejected with Busy,
//!   not queued
//! - Rejection costs no network call
//! - The slot frees up once the in-flight operation finishes
//!
//! If this test fails, overlapping refreshes can interleave store writes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use track_core::MemoryParcelStore;
use track_core::ParcelStore;

#[tokio::test]
async fn concurrent_trigger_is_rejected_with_busy() {
    let now = test_now();
    let stale = now - chrono::Duration::hours(1);
    let store = Arc::new(MemoryParcelStore::new());
    let resolver = Arc::new(MockResolver::new().with_delay(Duration::from_millis(200)));

    store.upsert(&record("TRK1", stale, false)).await.unwrap();
    resolver.push_ok(vec![Some(resolved("TRK1", "Delivered"))]);

    let (engine, _events) = engine_with(
        Arc::clone(&store) as Arc<dyn ParcelStore>,
        Arc::new(MockResolver::sharing_counters_with(&resolver)),
    );
    let engine = Arc::new(engine);

    let slow = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .refresh_stale(now, chrono::Duration::minutes(15), "en-US")
                .await
        })
    };

    // Let the first call reach the resolver and park on its delay
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = engine.refresh_one("TRK1", "en-US").await.unwrap_err();
    assert!(matches!(err, track_core::Error::Busy));

    let results = slow.await.unwrap().unwrap();
    assert_eq!(results.len(), 1, "in-flight refresh completes normally");

    // Only the first operation reached the network
    assert_eq!(resolver.track_call_count(), 1);
}

#[tokio::test]
async fn slot_is_released_after_completion() {
    let now = test_now();
    let stale = now - chrono::Duration::hours(1);
    let store = Arc::new(MemoryParcelStore::new());
    let resolver = Arc::new(MockResolver::new());

    store.upsert(&record("TRK1", stale, false)).await.unwrap();
    resolver.push_ok(vec![Some(resolved("TRK1", "In transit"))]);
    resolver.push_ok(vec![Some(resolved("TRK1", "Delivered"))]);

    let (engine, _events) = engine_with(
        Arc::clone(&store) as Arc<dyn ParcelStore>,
        Arc::new(MockResolver::sharing_counters_with(&resolver)),
    );

    engine
        .refresh_stale(now, chrono::Duration::minutes(15), "en-US")
        .await
        .unwrap();

    // Back-to-back sequential triggers both get the slot
    engine.refresh_one("TRK1", "en-US").await.unwrap();

    assert_eq!(resolver.track_call_count(), 2);
    assert_eq!(store.get("TRK1").await.unwrap().status, "Delivered");
}

#[tokio::test]
async fn archive_toggle_contends_on_the_same_slot() {
    let now = test_now();
    let stale = now - chrono::Duration::hours(1);
    let store = Arc::new(MemoryParcelStore::new());
    let resolver = Arc::new(MockResolver::new().with_delay(Duration::from_millis(200)));

    store.upsert(&record("TRK1", stale, false)).await.unwrap();
    resolver.push_ok(vec![Some(resolved("TRK1", "Delivered"))]);

    let (engine, _events) = engine_with(
        Arc::clone(&store) as Arc<dyn ParcelStore>,
        Arc::new(MockResolver::sharing_counters_with(&resolver)),
    );
    let engine = Arc::new(engine);

    let slow = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .refresh_stale(now, chrono::Duration::minutes(15), "en-US")
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;

    // Archiving mid-refresh would race the reconciliation writes
    let err = engine.set_archived("TRK1", true).await.unwrap_err();
    assert!(matches!(err, track_core::Error::Busy));

    slow.await.unwrap().unwrap();

    // And succeeds once the refresh is done
    engine.set_archived("TRK1", true).await.unwrap();
    assert!(store.get("TRK1").await.unwrap().archived);
}
