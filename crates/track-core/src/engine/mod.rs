//! Core sync engine
//!
//! The SyncEngine owns every mutation of the parcel store that involves the
//! remote resolver:
//!
//! - Deciding which stored records are stale enough to refresh
//! - Building batch requests of `(id, carriers)` pairs
//! - Reconciling resolver responses back into the store
//! - Serializing operations so at most one network/reconciliation cycle
//!   runs at a time
//!
//! ## Reconciliation
//!
//! The resolver answers positionally: entry `i` of the response answers
//! query `i` of the request. Per id, a returned parcel is upserted under the
//! requested id with a fresh `add_time` and the local `archived` flag merged
//! in (the wire has no archive field); an explicit `None` means the id is no
//! longer trackable and the local record is deleted outright. Nothing is
//! written until the whole response has been received and parsed, and a
//! structurally failed call performs no store mutation at all.
//!
//! ## Single flight
//!
//! All store-mutating operations contend on one pending-operation slot.
//! A trigger that arrives while another operation is in flight is rejected
//! with [`Error::Busy`] rather than queued; a single batch can touch many
//! ids, so per-id locking would not help.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::{ParcelRecord, ResolvedParcel};
use crate::traits::{ParcelStore, TrackQuery, TrackingResolver};

/// Default staleness threshold for batch refresh.
pub const DEFAULT_STALE_AFTER_MINS: i64 = 15;

/// Events emitted by the SyncEngine.
///
/// Notification only; consumers re-read the store for state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A refresh batch is about to be sent to the resolver
    RefreshStarted {
        /// Number of ids in the outgoing batch
        requested: usize,
    },

    /// A record was upserted from a resolver response
    RecordRefreshed {
        /// Tracking identifier
        id: String,
    },

    /// A record was deleted because the resolver returned no result for it
    RecordRemoved {
        /// Tracking identifier
        id: String,
    },

    /// A new parcel was added to the store
    ParcelAdded {
        /// Tracking identifier
        id: String,
    },

    /// A stale-refresh pass found nothing eligible; no network call was made
    RefreshSkipped,

    /// A resolver call failed structurally; the store was left untouched
    RefreshFailed {
        /// Error description
        error: String,
    },
}

/// Core sync engine.
///
/// Holds the store and resolver behind trait objects; all policy lives here,
/// the collaborators stay single-shot and stateless.
pub struct SyncEngine {
    /// Durable parcel store
    store: Arc<dyn ParcelStore>,

    /// Remote tracking resolver
    resolver: Arc<dyn TrackingResolver>,

    /// Pending-operation slot; holder is the one in-flight operation
    flight: Mutex<()>,

    /// Event sender for external observers
    event_tx: mpsc::Sender<EngineEvent>,
}

impl SyncEngine {
    /// Create a new sync engine.
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields
    /// engine events for a presentation layer or logger to consume.
    pub fn new(
        store: Arc<dyn ParcelStore>,
        resolver: Arc<dyn TrackingResolver>,
        config: &EngineConfig,
    ) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            store,
            resolver,
            flight: Mutex::new(()),
            event_tx: tx,
        };

        (engine, rx)
    }

    /// Refresh a single stored parcel regardless of staleness.
    ///
    /// Used for the detail-view manual refresh. Fails with
    /// [`Error::NotFound`] if the id is not stored.
    ///
    /// # Returns
    ///
    /// One entry per requested id (always one here), in request order.
    pub async fn refresh_one(
        &self,
        id: &str,
        language: &str,
    ) -> Result<Vec<Option<ParcelRecord>>> {
        let _flight = self.flight.try_lock().map_err(|_| Error::Busy)?;

        let record = self.store.get(id).await?;
        let queries = vec![TrackQuery::new(id, record.carriers.clone())];

        self.resolve_and_reconcile(&queries, language, Utc::now())
            .await
    }

    /// Refresh every non-archived record whose `add_time` is at least
    /// `stale_after` old at `now`.
    ///
    /// An empty eligible set is a no-op: no network call, no store mutation.
    /// Otherwise exactly one resolver call is issued for the whole batch,
    /// preserving the records' enumeration order.
    pub async fn refresh_stale(
        &self,
        now: DateTime<Utc>,
        stale_after: chrono::Duration,
        language: &str,
    ) -> Result<Vec<Option<ParcelRecord>>> {
        let _flight = self.flight.try_lock().map_err(|_| Error::Busy)?;

        let listing = self.store.list().await?;
        for entry in &listing.corrupt {
            warn!(id = %entry.id, reason = %entry.reason, "skipping corrupt record");
        }

        let queries: Vec<TrackQuery> = listing
            .records
            .iter()
            .filter(|r| is_refresh_eligible(r, now, stale_after))
            .map(|r| TrackQuery::new(r.id.clone(), r.carriers.clone()))
            .collect();

        if queries.is_empty() {
            debug!("no stale records, skipping refresh");
            self.emit_event(EngineEvent::RefreshSkipped);
            return Ok(Vec::new());
        }

        self.resolve_and_reconcile(&queries, language, now).await
    }

    /// Start tracking a new identifier.
    ///
    /// Fails fast with [`Error::AlreadyTracked`] before any network call if
    /// the id is already stored. The caller supplies the carrier list
    /// (typically the full carrier catalog, since no stored record exists
    /// yet to provide its own).
    pub async fn add_new(
        &self,
        id: &str,
        carriers: Vec<String>,
        language: &str,
    ) -> Result<Vec<Option<ParcelRecord>>> {
        let _flight = self.flight.try_lock().map_err(|_| Error::Busy)?;

        if self.store.exists(id).await? {
            return Err(Error::already_tracked(id));
        }

        let queries = vec![TrackQuery::new(id, carriers)];
        let results = self
            .resolve_and_reconcile(&queries, language, Utc::now())
            .await?;

        if results.first().is_some_and(|r| r.is_some()) {
            info!(id, "parcel added");
            self.emit_event(EngineEvent::ParcelAdded { id: id.to_string() });
        } else {
            debug!(id, "resolver returned no result for new parcel");
        }

        Ok(results)
    }

    /// Flip a record's archive flag in place and re-persist it.
    ///
    /// `add_time` is left untouched; archiving is not a refresh.
    pub async fn set_archived(&self, id: &str, archived: bool) -> Result<()> {
        let _flight = self.flight.try_lock().map_err(|_| Error::Busy)?;

        let mut record = self.store.get(id).await?;
        record.archived = archived;
        self.store.upsert(&record).await
    }

    /// Remove a record entirely; a no-op if absent.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let _flight = self.flight.try_lock().map_err(|_| Error::Busy)?;

        self.store.delete(id).await?;
        self.emit_event(EngineEvent::RecordRemoved { id: id.to_string() });
        Ok(())
    }

    /// Issue one resolver call for `queries` and reconcile the response.
    ///
    /// Caller must hold the flight slot.
    async fn resolve_and_reconcile(
        &self,
        queries: &[TrackQuery],
        language: &str,
        stamped_at: DateTime<Utc>,
    ) -> Result<Vec<Option<ParcelRecord>>> {
        self.emit_event(EngineEvent::RefreshStarted {
            requested: queries.len(),
        });
        debug!(requested = queries.len(), language, "issuing track request");

        let results = match self.resolver.track(queries, language).await {
            Ok(results) => results,
            Err(e) => {
                warn!("resolver call failed: {}", e);
                self.emit_event(EngineEvent::RefreshFailed {
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        // Correlation is positional; a length mismatch means the response
        // cannot be trusted and nothing may be reconciled from it.
        if results.len() != queries.len() {
            let e = Error::resolver(format!(
                "response length mismatch: requested {}, got {}",
                queries.len(),
                results.len()
            ));
            warn!("{}", e);
            self.emit_event(EngineEvent::RefreshFailed {
                error: e.to_string(),
            });
            return Err(e);
        }

        self.reconcile(queries, results, stamped_at).await
    }

    /// Merge a structurally successful response into the store.
    async fn reconcile(
        &self,
        queries: &[TrackQuery],
        results: Vec<Option<ResolvedParcel>>,
        stamped_at: DateTime<Utc>,
    ) -> Result<Vec<Option<ParcelRecord>>> {
        let mut reconciled = Vec::with_capacity(results.len());

        for (query, result) in queries.iter().zip(results) {
            match result {
                Some(resolved) => {
                    let archived = match self.store.get(&query.id).await {
                        Ok(prev) => prev.archived,
                        Err(Error::NotFound(_)) => false,
                        // An unreadable prior value cannot contribute a flag
                        Err(Error::CorruptRecord { .. }) => false,
                        Err(e) => return Err(e),
                    };

                    let mut record = ParcelRecord::from_resolved(resolved, stamped_at, archived);
                    // Keyed by the requested id; the resolver may echo a
                    // normalized one
                    record.id = query.id.clone();

                    self.store.upsert(&record).await?;
                    debug!(id = %record.id, status = %record.status, "record refreshed");
                    self.emit_event(EngineEvent::RecordRefreshed {
                        id: record.id.clone(),
                    });
                    reconciled.push(Some(record));
                }
                None => {
                    // No result inside a successful response: the id is no
                    // longer trackable, drop the local record
                    self.store.delete(&query.id).await?;
                    info!(id = %query.id, "record no longer resolvable, removed");
                    self.emit_event(EngineEvent::RecordRemoved {
                        id: query.id.clone(),
                    });
                    reconciled.push(None);
                }
            }
        }

        Ok(reconciled)
    }

    /// Emit an engine event, dropping it if the channel is full.
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping event");
        }
    }
}

/// Batch-refresh eligibility: not archived, and stale at `now`.
fn is_refresh_eligible(
    record: &ParcelRecord,
    now: DateTime<Utc>,
    stale_after: chrono::Duration,
) -> bool {
    !record.archived && record.is_stale(now, stale_after)
}
