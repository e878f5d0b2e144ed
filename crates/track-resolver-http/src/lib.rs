// # HTTP Tracking Resolver
//
// This crate provides the HTTP implementation of the tracking resolver
// seam for the parcel tracking client.
//
// ## Wire format
//
// - `GET /carriers` → JSON array of carrier identifier strings
// - `POST /track` with body `{"parcels": [[id, [carriers...]], ...],
//   "language": "<locale>"}` → `{"Ok": [record-or-null, ...]}` where the
//   array answers the request positionally. A top-level `Ok` that is null
//   or absent signals a structural failure of the whole batch.
//
// ## Failure mapping
//
// Transport errors, non-2xx statuses, malformed bodies, a null `Ok`, a
// response length that differs from the request, and timeouts all map to
// `Error::Resolver`. None of them may be reported as per-id nulls — the
// engine deletes local records on per-id null.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use track_core::config::ResolverConfig;
use track_core::model::ResolvedParcel;
use track_core::traits::{TrackQuery, TrackingResolver};
use track_core::{Error, Result};

/// Default request timeout. Unbounded waits would stall the single-flight
/// engine slot indefinitely.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client for the remote tracking resolution service.
pub struct HttpResolver {
    /// Base URL of the service, without a trailing slash
    base_url: String,

    /// HTTP client with a bounded timeout
    client: reqwest::Client,
}

/// Request body for `POST /track`.
#[derive(Debug, Serialize)]
struct TrackRequestBody {
    parcels: Vec<(String, Vec<String>)>,
    language: String,
}

/// Response body for `POST /track`.
///
/// The service serializes a result type, so a failed batch arrives as a
/// missing or null `Ok` field.
#[derive(Debug, Deserialize)]
struct TrackResponseBody {
    #[serde(rename = "Ok", default)]
    ok: Option<Vec<Option<ResolvedParcel>>>,
}

impl HttpResolver {
    /// Create a resolver for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a resolver with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Create a resolver from a validated configuration.
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::with_timeout(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl TrackingResolver for HttpResolver {
    async fn carriers(&self) -> Result<Vec<String>> {
        let url = self.url("/carriers");
        debug!(%url, "fetching carrier list");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::resolver(format!("carriers request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::resolver(format!(
                "carriers request returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| Error::resolver(format!("malformed carriers response: {}", e)))
    }

    async fn track(
        &self,
        queries: &[TrackQuery],
        language: &str,
    ) -> Result<Vec<Option<ResolvedParcel>>> {
        let body = TrackRequestBody {
            parcels: queries
                .iter()
                .map(|q| (q.id.clone(), q.carriers.clone()))
                .collect(),
            language: language.to_string(),
        };

        let url = self.url("/track");
        debug!(%url, requested = queries.len(), "sending track request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::resolver(format!("track request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "track request rejected");
            return Err(Error::resolver(format!(
                "track request returned {}",
                response.status()
            )));
        }

        let parsed: TrackResponseBody = response
            .json()
            .await
            .map_err(|e| Error::resolver(format!("malformed track response: {}", e)))?;

        let results = parsed
            .ok
            .ok_or_else(|| Error::resolver("track response reported a failed batch"))?;

        if results.len() != queries.len() {
            return Err(Error::resolver(format!(
                "track response length mismatch: requested {}, got {}",
                queries.len(),
                results.len()
            )));
        }

        Ok(results)
    }
}
