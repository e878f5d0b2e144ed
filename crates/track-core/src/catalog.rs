//! Carrier catalog
//!
//! A process-lifetime cache of the supported-carrier list. Fetched once
//! during startup via the resolver's `/carriers` surface; a failure there
//! fails application bootstrap (retry, if desired, belongs to the caller).
//! Read-only afterward, with no invalidation.

use tracing::info;

use crate::error::Result;
use crate::traits::TrackingResolver;

/// The supported-carrier list, loaded once at startup.
#[derive(Debug, Clone)]
pub struct CarrierCatalog {
    carriers: Vec<String>,
}

impl CarrierCatalog {
    /// Fetch the carrier list from the resolver.
    pub async fn load(resolver: &dyn TrackingResolver) -> Result<Self> {
        let carriers = resolver.carriers().await?;
        info!(count = carriers.len(), "carrier catalog loaded");
        Ok(Self { carriers })
    }

    /// Build a catalog from a known list (tests, offline tooling).
    pub fn from_carriers(carriers: Vec<String>) -> Self {
        Self { carriers }
    }

    /// All carrier identifiers, in server order.
    pub fn all(&self) -> &[String] {
        &self.carriers
    }

    /// Check whether a carrier identifier is known.
    pub fn contains(&self, carrier: &str) -> bool {
        self.carriers.iter().any(|c| c == carrier)
    }

    /// Number of known carriers.
    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    /// Check whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }
}
