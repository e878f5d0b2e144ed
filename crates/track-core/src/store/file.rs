// # File Parcel Store
//
// File-based implementation of ParcelStore with crash recovery.
//
// ## Purpose
//
// Durable storage of tracked parcels across restarts. The file holds one
// entry per tracking identifier in a namespace private to this application;
// nothing else is co-mingled in it.
//
// ## Crash Recovery
//
// - Atomic writes: new state written to a temporary file, then renamed
// - Backup: last known good state kept in a `.backup` file
// - Corruption detection: JSON validation on load
// - Recovery: falls back to the backup if the main file is corrupted
//
// ## Corrupt entries
//
// Record values are kept as raw JSON and parsed individually, so one entry
// that fails to parse is reported through `StoreListing::corrupt` without
// breaking enumeration of the rest.
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "parcels": {
//     "TRK1": { "id": "TRK1", "status": "In transit", ... }
//   }
// }
// ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::model::ParcelRecord;
use crate::traits::parcel_store::{CorruptEntry, ParcelStore, StoreListing};

/// State file format version, for future migration if the format changes
const STATE_FILE_VERSION: &str = "1.0";

/// File-based parcel store with atomic writes and corruption recovery.
#[derive(Debug)]
pub struct FileParcelStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

#[derive(Debug)]
struct FileState {
    // Raw values so a single corrupt entry surfaces per-id, not per-file
    parcels: HashMap<String, serde_json::Value>,
}

/// Serializable state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    parcels: HashMap<String, serde_json::Value>,
}

impl FileParcelStore {
    /// Create or load a file parcel store.
    ///
    /// This will:
    /// 1. Try to load the existing state file
    /// 2. If corruption is detected, try to load from the backup
    /// 3. If both fail, start with empty state
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::store(format!(
                    "failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let parcels = Self::load_state_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState { parcels })),
        })
    }

    /// Load state from file, falling back to the backup on corruption.
    async fn load_state_with_recovery(
        path: &Path,
    ) -> Result<HashMap<String, serde_json::Value>, Error> {
        match Self::load_state(path).await {
            Ok(parcels) => {
                tracing::debug!("loaded state file: {} parcels", parcels.len());
                Ok(parcels)
            }
            Err(e) => {
                tracing::warn!(
                    "state file appears corrupted: {}. attempting recovery from backup",
                    e
                );

                let backup_path = Self::backup_path(path);
                if backup_path.exists() {
                    match Self::load_state(&backup_path).await {
                        Ok(parcels) => {
                            tracing::info!("recovered state from backup: {} parcels", parcels.len());
                            if let Err(restore_err) = fs::copy(&backup_path, path).await {
                                tracing::error!(
                                    "failed to restore state file from backup: {}",
                                    restore_err
                                );
                            }
                            Ok(parcels)
                        }
                        Err(backup_err) => {
                            tracing::error!(
                                "backup also corrupted: {}. starting with empty state",
                                backup_err
                            );
                            Ok(HashMap::new())
                        }
                    }
                } else {
                    tracing::warn!("no backup file found, starting with empty state");
                    Ok(HashMap::new())
                }
            }
        }
    }

    async fn load_state(path: &Path) -> Result<HashMap<String, serde_json::Value>, Error> {
        if !path.exists() {
            tracing::debug!("state file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::store(format!("failed to read state file {}: {}", path.display(), e))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::store(format!(
                "failed to parse state file {}: {}",
                path.display(),
                e
            ))
        })?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "state file version mismatch: expected {}, got {}. loading anyway",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(state_file.parcels)
    }

    /// Write state to file atomically (temp file + rename, backup of the
    /// previous file).
    async fn write_state(&self) -> Result<(), Error> {
        let state_guard = self.state.read().await;
        let state_file = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            parcels: state_guard.parcels.clone(),
        };
        drop(state_guard);

        let json = serde_json::to_string_pretty(&state_file)
            .map_err(|e| Error::store(format!("failed to serialize state: {}", e)))?;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::store(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("state written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl ParcelStore for FileParcelStore {
    async fn list(&self) -> Result<StoreListing, Error> {
        let state_guard = self.state.read().await;
        let mut listing = StoreListing::default();

        for (id, value) in &state_guard.parcels {
            match serde_json::from_value::<ParcelRecord>(value.clone()) {
                Ok(record) => listing.records.push(record),
                Err(e) => listing.corrupt.push(CorruptEntry {
                    id: id.clone(),
                    reason: e.to_string(),
                }),
            }
        }

        Ok(listing)
    }

    async fn get(&self, id: &str) -> Result<ParcelRecord, Error> {
        let state_guard = self.state.read().await;
        let value = state_guard
            .parcels
            .get(id)
            .ok_or_else(|| Error::not_found(id))?;

        serde_json::from_value(value.clone())
            .map_err(|e| Error::corrupt_record(id, e.to_string()))
    }

    async fn exists(&self, id: &str) -> Result<bool, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.parcels.contains_key(id))
    }

    async fn upsert(&self, record: &ParcelRecord) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            let value = serde_json::to_value(record)?;
            state_guard.parcels.insert(record.id.clone(), value);
        }

        // Immediate write for durability
        self.write_state().await
    }

    async fn delete(&self, id: &str) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            state_guard.parcels.remove(id);
        }

        // Immediate write for durability
        self.write_state().await
    }
}
