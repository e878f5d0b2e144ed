//! Data model for tracked parcels
//!
//! Two record shapes exist on purpose:
//!
//! - [`ResolvedParcel`] is what the remote resolver returns for one id. It
//!   carries no local state.
//! - [`ParcelRecord`] is what the store persists: the resolved fields plus
//!   `add_time` (stamped by the sync engine on every successful upsert) and
//!   the user-controlled `archived` flag, which the resolver knows nothing
//!   about.
//!
//! Wire names are `snake_case`; timestamps are ISO-8601 via chrono, so their
//! string form orders the same way as their instants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tracking event reported by a carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelEvent {
    /// When the event happened
    pub datetime: DateTime<Utc>,
    /// Free-text description
    pub description: String,
    /// Where it happened, when the carrier reports one
    pub region: Option<String>,
    /// Which carrier reported it
    pub carrier: Option<String>,
}

/// A parcel as returned by the remote resolver for a single id.
///
/// `events` is ordered newest-first: index 0 is the most recent event, the
/// last index is the tracking-start event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParcel {
    /// Tracking identifier
    pub id: String,
    /// Optional user-assigned label
    #[serde(default)]
    pub name: Option<String>,
    /// Carriers to query for this id; never empty for a renderable parcel
    pub carriers: Vec<String>,
    /// Latest known status text
    pub status: String,
    /// Origin region, when known
    #[serde(default)]
    pub start_region: Option<String>,
    /// Destination region
    pub end_region: String,
    /// Product/service name, when known
    #[serde(default)]
    pub product: Option<String>,
    /// Tracking events, newest first
    pub events: Vec<ParcelEvent>,
}

impl ResolvedParcel {
    /// Most recent event, if any.
    pub fn latest_event(&self) -> Option<&ParcelEvent> {
        self.events.first()
    }

    /// Earliest (tracking-start) event, if any.
    pub fn first_event(&self) -> Option<&ParcelEvent> {
        self.events.last()
    }
}

/// A parcel record as persisted in the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelRecord {
    /// Tracking identifier; primary key within the store
    pub id: String,
    /// Optional user-assigned label
    #[serde(default)]
    pub name: Option<String>,
    /// Carriers to query when refreshing this id
    pub carriers: Vec<String>,
    /// Latest known status text
    pub status: String,
    /// Origin region, when known
    #[serde(default)]
    pub start_region: Option<String>,
    /// Destination region
    pub end_region: String,
    /// Product/service name, when known
    #[serde(default)]
    pub product: Option<String>,
    /// Tracking events, newest first
    pub events: Vec<ParcelEvent>,
    /// When the sync engine last (re)wrote this record; staleness input only
    pub add_time: DateTime<Utc>,
    /// User-controlled archive flag; never set by the sync engine
    #[serde(default)]
    pub archived: bool,
}

impl ParcelRecord {
    /// Build a stored record from a resolver result.
    ///
    /// `archived` is merged in by the caller since the resolver response has
    /// no notion of local archive state.
    pub fn from_resolved(parcel: ResolvedParcel, add_time: DateTime<Utc>, archived: bool) -> Self {
        Self {
            id: parcel.id,
            name: parcel.name,
            carriers: parcel.carriers,
            status: parcel.status,
            start_region: parcel.start_region,
            end_region: parcel.end_region,
            product: parcel.product,
            events: parcel.events,
            add_time,
            archived,
        }
    }

    /// Check if the record is stale (older than the given duration) at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now.signed_duration_since(self.add_time) >= max_age
    }

    /// Most recent event, if any.
    pub fn latest_event(&self) -> Option<&ParcelEvent> {
        self.events.first()
    }

    /// Earliest (tracking-start) event, if any.
    pub fn first_event(&self) -> Option<&ParcelEvent> {
        self.events.last()
    }

    /// Label for display: `name (id)` when a name is set, otherwise the id.
    pub fn display_label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("{} ({})", name, self.id),
            _ => self.id.clone(),
        }
    }
}
