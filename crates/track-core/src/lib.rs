// # track-core
//
// Core library for the multi-carrier parcel tracking client.
//
// ## Architecture Overview
//
// - **ParcelStore**: Trait for durable persistence of parcel records
// - **TrackingResolver**: Trait for the remote tracking resolution service
// - **SyncEngine**: Decides which records are stale, batches refresh
//   requests, and reconciles responses back into the store
// - **CarrierCatalog**: Supported-carrier list, loaded once at startup
// - **ViewController**: List/detail state machine mapping the user-facing
//   refresh action to the right sync operation
//
// ## Design Principles
//
// 1. **Separation of concerns**: all policy lives in the engine; the store
//    and resolver are dumb, single-purpose collaborators behind traits
// 2. **No partial reconciliation**: store mutation happens strictly after a
//    structurally successful response, and never on a failed one
// 3. **Single flight**: at most one network/reconciliation cycle at a time
// 4. **Library-first**: no HTTP here; the resolver implementation lives in
//    `track-resolver-http`

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;
pub mod traits;
pub mod view;

// Re-export core types for convenience
pub use catalog::CarrierCatalog;
pub use config::{EngineConfig, ResolverConfig, StoreConfig, TrackConfig};
pub use engine::{DEFAULT_STALE_AFTER_MINS, EngineEvent, SyncEngine};
pub use error::{Error, Result};
pub use model::{ParcelEvent, ParcelRecord, ResolvedParcel};
pub use store::{FileParcelStore, MemoryParcelStore};
pub use traits::{CorruptEntry, ParcelStore, StoreListing, TrackQuery, TrackingResolver};
pub use view::{RefreshIntent, UiEvent, View, ViewController};
