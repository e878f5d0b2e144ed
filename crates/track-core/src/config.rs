//! Configuration types for the tracking client
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main tracking client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Remote resolver configuration
    pub resolver: ResolverConfig,

    /// Parcel store configuration
    pub store: StoreConfig,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl TrackConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.resolver.validate()?;
        self.store.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Remote resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Base URL of the tracking resolution service
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty() {
            return Err(crate::Error::config("resolver base URL cannot be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "resolver base URL must use http or https, got: {}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("resolver timeout must be > 0"));
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Parcel store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store, lost on restart
    Memory,

    /// File-backed store
    File {
        /// Path to the state file
        path: String,
    },
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("store path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Memory
    }
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Age after which a record is eligible for batch refresh, in seconds
    pub stale_after_secs: u64,

    /// Interval between automatic stale-refresh passes, in seconds
    pub refresh_interval_secs: u64,

    /// Locale hint forwarded to the resolver
    pub language: String,

    /// Capacity of the engine event channel
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.stale_after_secs == 0 {
            return Err(crate::Error::config("stale_after_secs must be > 0"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(crate::Error::config("refresh_interval_secs must be > 0"));
        }
        if self.language.is_empty() {
            return Err(crate::Error::config("language cannot be empty"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        Ok(())
    }

    /// Staleness threshold as a chrono duration
    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.stale_after_secs as i64)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 15 * 60,
            refresh_interval_secs: 5 * 60,
            language: "en-US".to_string(),
            event_channel_capacity: 100,
        }
    }
}
