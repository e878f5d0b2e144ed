//! Test doubles and common utilities for sync-engine contract tests
//!
//! This module provides a scriptable resolver double that verifies the
//! engine's contracts without touching the network.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use track_core::error::{Error, Result};
use track_core::model::{ParcelEvent, ParcelRecord, ResolvedParcel};
use track_core::traits::{ParcelStore, TrackQuery, TrackingResolver};
use track_core::{EngineConfig, EngineEvent, SyncEngine};

/// A scriptable TrackingResolver that tracks calls.
///
/// Each `track()` call consumes the next scripted response. Calls beyond
/// the script fail, so a test that expects zero network calls simply
/// scripts nothing and asserts on the counter.
pub struct MockResolver {
    /// Carrier list served by carriers()
    carriers: Vec<String>,
    /// Scripted responses, consumed front to back
    script: Arc<std::sync::Mutex<VecDeque<Result<Vec<Option<ResolvedParcel>>>>>>,
    /// Call counter for track()
    track_call_count: Arc<AtomicUsize>,
    /// Call counter for carriers()
    carriers_call_count: Arc<AtomicUsize>,
    /// Every query batch track() received, in call order
    recorded_queries: Arc<std::sync::Mutex<Vec<Vec<TrackQuery>>>>,
    /// Artificial latency per track() call, for in-flight overlap tests
    delay: Option<Duration>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self {
            carriers: vec!["CarrierA".to_string(), "CarrierB".to_string()],
            script: Arc::new(std::sync::Mutex::new(VecDeque::new())),
            track_call_count: Arc::new(AtomicUsize::new(0)),
            carriers_call_count: Arc::new(AtomicUsize::new(0)),
            recorded_queries: Arc::new(std::sync::Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Queue a successful response.
    pub fn push_ok(&self, results: Vec<Option<ResolvedParcel>>) {
        self.script.lock().unwrap().push_back(Ok(results));
    }

    /// Queue a structural failure.
    pub fn push_err(&self, message: &str) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(Error::resolver(message)));
    }

    /// Delay every track() call by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times track() was called.
    pub fn track_call_count(&self) -> usize {
        self.track_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times carriers() was called.
    pub fn carriers_call_count(&self) -> usize {
        self.carriers_call_count.load(Ordering::SeqCst)
    }

    /// Get every query batch track() received.
    pub fn recorded_queries(&self) -> Vec<Vec<TrackQuery>> {
        self.recorded_queries.lock().unwrap().clone()
    }

    /// Create a new MockResolver that shares counters and script with an
    /// existing one.
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            carriers: other.carriers.clone(),
            script: Arc::clone(&other.script),
            track_call_count: Arc::clone(&other.track_call_count),
            carriers_call_count: Arc::clone(&other.carriers_call_count),
            recorded_queries: Arc::clone(&other.recorded_queries),
            delay: other.delay,
        }
    }
}

#[async_trait::async_trait]
impl TrackingResolver for MockResolver {
    async fn carriers(&self) -> Result<Vec<String>> {
        self.carriers_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.carriers.clone())
    }

    async fn track(
        &self,
        queries: &[TrackQuery],
        _language: &str,
    ) -> Result<Vec<Option<ResolvedParcel>>> {
        self.track_call_count.fetch_add(1, Ordering::SeqCst);
        self.recorded_queries.lock().unwrap().push(queries.to_vec());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::resolver("unscripted track call")))
    }
}

/// Fixed reference instant so staleness math is deterministic.
pub fn test_now() -> DateTime<Utc> {
    Utc.timestamp_opt(1_756_000_000, 0).unwrap()
}

/// Build a resolver-shaped parcel with one event.
pub fn resolved(id: &str, status: &str) -> ResolvedParcel {
    ResolvedParcel {
        id: id.to_string(),
        name: None,
        carriers: vec!["CarrierA".to_string()],
        status: status.to_string(),
        start_region: Some("DE".to_string()),
        end_region: "SE".to_string(),
        product: None,
        events: vec![ParcelEvent {
            datetime: test_now(),
            description: status.to_string(),
            region: Some("SE".to_string()),
            carrier: Some("CarrierA".to_string()),
        }],
    }
}

/// Build a stored record with a controlled age and archive flag.
pub fn record(id: &str, add_time: DateTime<Utc>, archived: bool) -> ParcelRecord {
    ParcelRecord::from_resolved(resolved(id, "In transit"), add_time, archived)
}

/// Engine wired to the given store and resolver with default settings.
pub fn engine_with(
    store: Arc<dyn ParcelStore>,
    resolver: Arc<MockResolver>,
) -> (SyncEngine, tokio::sync::mpsc::Receiver<EngineEvent>) {
    SyncEngine::new(store, resolver, &EngineConfig::default())
}
