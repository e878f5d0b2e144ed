// # Parcel Store Trait
//
// Defines the interface for durable persistence of parcel records.
//
// ## Purpose
//
// The store is pure CRUD plus enumeration, keyed by tracking identifier.
// It has no network awareness and makes no decisions: the sync engine
// stamps `add_time` before calling `upsert`, and the store writes records
// verbatim. Enumeration order is unspecified; callers sort as needed.
//
// ## Implementations
//
// - Memory: ephemeral, for tests and throwaway runs
// - File: single JSON state file with atomic writes and crash recovery

use async_trait::async_trait;

use crate::model::ParcelRecord;

/// Result of enumerating the store.
///
/// A malformed persisted value must not break enumeration of the rest, so
/// `list()` returns the records that parsed alongside the entries that did
/// not. Callers decide how to surface the corrupt ones.
#[derive(Debug, Clone, Default)]
pub struct StoreListing {
    /// Records that deserialized cleanly
    pub records: Vec<ParcelRecord>,
    /// Entries whose stored value failed to parse
    pub corrupt: Vec<CorruptEntry>,
}

/// A stored entry that failed to deserialize.
#[derive(Debug, Clone)]
pub struct CorruptEntry {
    /// Tracking identifier the value was stored under
    pub id: String,
    /// Parse failure detail
    pub reason: String,
}

/// Trait for parcel store implementations.
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait ParcelStore: Send + Sync {
    /// Enumerate all persisted records, isolating corrupt entries.
    async fn list(&self) -> Result<StoreListing, crate::Error>;

    /// Get a record by tracking identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(ParcelRecord)`: the stored record
    /// - `Err(Error::NotFound)`: no record exists for `id`
    /// - `Err(Error::CorruptRecord)`: a value exists but fails to parse
    async fn get(&self, id: &str) -> Result<ParcelRecord, crate::Error>;

    /// Check whether a record exists for `id`.
    async fn exists(&self, id: &str) -> Result<bool, crate::Error>;

    /// Serialize and write a record, overwriting any prior value for its id.
    ///
    /// The write is durable before this returns. The caller is responsible
    /// for `add_time`; the store does not touch it.
    async fn upsert(&self, record: &ParcelRecord) -> Result<(), crate::Error>;

    /// Remove a record; a no-op (not an error) if absent.
    async fn delete(&self, id: &str) -> Result<(), crate::Error>;
}
