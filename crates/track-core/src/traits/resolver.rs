// # Tracking Resolver Trait
//
// Defines the interface for the remote tracking resolution service.
//
// ## Implementations
//
// - HTTP: `track-resolver-http` crate (`GET /carriers`, `POST /track`)
//
// ## Contract
//
// Resolvers are single-shot and stateless: one call per invocation, no
// retry, no caching, no access to the local store. The sync engine owns all
// policy (staleness, reconciliation, serialization of calls); a resolver
// only turns `(id, carriers)` pairs into results.
//
// The response MUST preserve request order: entry `i` answers query `i`.
// A per-id "cannot resolve" is `None` inside a successful response and is
// data, not an error. A structural failure of the whole call (transport
// error, non-2xx, malformed body, timeout) is an `Err` and must never be
// reported as per-id `None` values — the engine deletes records on `None`.

use async_trait::async_trait;

use crate::model::ResolvedParcel;

/// One entry of a batch tracking request.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackQuery {
    /// Tracking identifier to resolve
    pub id: String,
    /// Carriers to query for this id
    pub carriers: Vec<String>,
}

impl TrackQuery {
    /// Create a new query.
    pub fn new(id: impl Into<String>, carriers: Vec<String>) -> Self {
        Self {
            id: id.into(),
            carriers,
        }
    }
}

/// Trait for remote tracking resolver implementations.
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait TrackingResolver: Send + Sync {
    /// Fetch the list of supported carrier identifiers.
    ///
    /// Called once at startup to seed the carrier catalog; a failure here
    /// fails application bootstrap.
    async fn carriers(&self) -> Result<Vec<String>, crate::Error>;

    /// Resolve a batch of tracking queries.
    ///
    /// # Returns
    ///
    /// - `Ok(results)`: one entry per query, in query order; `None` marks an
    ///   id the carriers could not resolve
    /// - `Err(Error::Resolver)`: the call failed structurally; no per-id
    ///   information is available
    async fn track(
        &self,
        queries: &[TrackQuery],
        language: &str,
    ) -> Result<Vec<Option<ResolvedParcel>>, crate::Error>;
}
