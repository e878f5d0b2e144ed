// # Memory Parcel Store
//
// In-memory implementation of ParcelStore.
//
// ## Purpose
//
// Provides a simple, fast store that doesn't persist across restarts.
// Useful for tests and throwaway sessions; a restart simply means the user
// re-adds their tracking identifiers.
//
// Records are held fully typed, so `list()` never reports corrupt entries.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::model::ParcelRecord;
use crate::traits::parcel_store::{ParcelStore, StoreListing};

/// In-memory parcel store implementation.
///
/// All state lives in a HashMap protected by a RwLock. Cloning shares the
/// underlying map.
#[derive(Debug, Clone)]
pub struct MemoryParcelStore {
    inner: Arc<RwLock<HashMap<String, ParcelRecord>>>,
}

impl MemoryParcelStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of records in the store.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Clear all records from the store.
    pub async fn clear(&self) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.clear();
        Ok(())
    }
}

impl Default for MemoryParcelStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ParcelStore for MemoryParcelStore {
    async fn list(&self) -> Result<StoreListing, Error> {
        let guard = self.inner.read().await;
        Ok(StoreListing {
            records: guard.values().cloned().collect(),
            corrupt: Vec::new(),
        })
    }

    async fn get(&self, id: &str) -> Result<ParcelRecord, Error> {
        let guard = self.inner.read().await;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(id))
    }

    async fn exists(&self, id: &str) -> Result<bool, Error> {
        let guard = self.inner.read().await;
        Ok(guard.contains_key(id))
    }

    async fn upsert(&self, record: &ParcelRecord) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(id);
        Ok(())
    }
}
