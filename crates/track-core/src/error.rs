//! Error types for the tracking client
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for tracking operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the tracking client
#[derive(Error, Debug)]
pub enum Error {
    /// Store lookup for an id that does not exist
    #[error("parcel not found: {0}")]
    NotFound(String),

    /// Attempted add of an id already present in the store
    #[error("parcel already tracked: {0}")]
    AlreadyTracked(String),

    /// A stored value failed to parse
    #[error("corrupt record '{id}': {reason}")]
    CorruptRecord {
        /// Tracking identifier of the offending entry
        id: String,
        /// Parse failure detail
        reason: String,
    },

    /// The resolver call did not complete structurally
    /// (transport failure, non-2xx, malformed response, top-level `Ok: null`)
    #[error("resolver error: {0}")]
    Resolver(String),

    /// Store persistence errors
    #[error("store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// A sync operation is already in flight
    #[error("a refresh is already in flight")]
    Busy,

    /// I/O errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "not found" error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create an "already tracked" error
    pub fn already_tracked(id: impl Into<String>) -> Self {
        Self::AlreadyTracked(id.into())
    }

    /// Create a corrupt record error
    pub fn corrupt_record(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a resolver error
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::Resolver(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
