//! Core traits for the tracking client
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`TrackingResolver`]: Resolve tracking identifiers via the remote service
//! - [`ParcelStore`]: Durable local persistence of parcel records

pub mod parcel_store;
pub mod resolver;

pub use parcel_store::{CorruptEntry, ParcelStore, StoreListing};
pub use resolver::{TrackQuery, TrackingResolver};
