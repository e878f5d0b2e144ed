//! Contract Test: Persistence Across Restarts
//!
//! Verifies the end-to-end lifecycle against the file-backed store:
//! - A parcel added in one session is visible to an engine built over a
//!   fresh store instance on the same file
//! - Archive state set in one session gates batch refresh in the next
//! - A deletion reconciled in one session stays deleted
//!
//! If this test fails, tracked parcels do not survive a restart.

mod common;

use std::sync::Arc;

use common::*;
use track_core::{FileParcelStore, ParcelStore};

#[tokio::test]
async fn added_parcel_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parcels.json");

    // First session: add a parcel
    {
        let store = Arc::new(FileParcelStore::new(&path).await.unwrap());
        let resolver = Arc::new(MockResolver::new());
        resolver.push_ok(vec![Some(resolved("TRK1", "In transit"))]);

        let (engine, _events) = engine_with(
            Arc::clone(&store) as Arc<dyn ParcelStore>,
            Arc::new(MockResolver::sharing_counters_with(&resolver)),
        );
        engine
            .add_new("TRK1", vec!["CarrierA".to_string()], "en-US")
            .await
            .unwrap();
    }

    // Second session: fresh store instance over the same file
    {
        let store = Arc::new(FileParcelStore::new(&path).await.unwrap());
        let restored = store.get("TRK1").await.unwrap();
        assert_eq!(restored.status, "In transit");
        assert!(!restored.archived);
    }
}

#[tokio::test]
async fn archive_state_gates_refresh_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parcels.json");
    let now = test_now();

    {
        let store = Arc::new(FileParcelStore::new(&path).await.unwrap());
        store
            .upsert(&record("TRK1", now - chrono::Duration::hours(1), false))
            .await
            .unwrap();

        let resolver = Arc::new(MockResolver::new());
        let (engine, _events) = engine_with(
            Arc::clone(&store) as Arc<dyn ParcelStore>,
            Arc::new(MockResolver::sharing_counters_with(&resolver)),
        );
        engine.set_archived("TRK1", true).await.unwrap();
    }

    {
        let store = Arc::new(FileParcelStore::new(&path).await.unwrap());
        let resolver = Arc::new(MockResolver::new());
        let (engine, _events) = engine_with(
            Arc::clone(&store) as Arc<dyn ParcelStore>,
            Arc::new(MockResolver::sharing_counters_with(&resolver)),
        );

        let results = engine
            .refresh_stale(now, chrono::Duration::minutes(15), "en-US")
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(
            resolver.track_call_count(),
            0,
            "archived record must stay out of the batch after restart"
        );
    }
}

#[tokio::test]
async fn reconciled_deletion_is_durable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parcels.json");

    {
        let store = Arc::new(FileParcelStore::new(&path).await.unwrap());
        store
            .upsert(&record("TRK1", test_now() - chrono::Duration::hours(1), false))
            .await
            .unwrap();

        let resolver = Arc::new(MockResolver::new());
        resolver.push_ok(vec![None]);

        let (engine, _events) = engine_with(
            Arc::clone(&store) as Arc<dyn ParcelStore>,
            Arc::new(MockResolver::sharing_counters_with(&resolver)),
        );
        engine.refresh_one("TRK1", "en-US").await.unwrap();
        assert!(!store.exists("TRK1").await.unwrap());
    }

    {
        let store = Arc::new(FileParcelStore::new(&path).await.unwrap());
        assert!(!store.exists("TRK1").await.unwrap());
        assert!(store.list().await.unwrap().records.is_empty());
    }
}
