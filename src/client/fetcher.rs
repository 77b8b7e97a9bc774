//! Single-attempt retrieval of the current snapshot from the store.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tracing::debug;

use crate::config::PollConfig;
use crate::error::{AquaError, FetchError};
use crate::quality::Snapshot;

/// Source of snapshots, abstracted so the poller can be driven by a
/// scripted implementation in tests.
#[async_trait]
pub trait FetchSnapshot: Send + Sync {
    /// Perform one fetch attempt. No retries: retry policy belongs to the
    /// poller's interval.
    async fn fetch(&self) -> Result<Snapshot, FetchError>;
}

/// HTTP fetcher performing cache-busted GETs against the snapshot store.
///
/// Every call appends a fresh uniqueness token to the URL and disables
/// intermediary caching, so each attempt observes the store's current state
/// rather than a stale cached copy. Stateless per call; the only shared
/// piece is the connection pool inside [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    http: reqwest::Client,
    store_url: String,
}

impl SnapshotFetcher {
    /// Build a fetcher from the polling configuration.
    ///
    /// The request timeout comes from [`PollConfig::fetch_timeout`]; timeout
    /// expiry surfaces as [`FetchError::Unreachable`].
    pub fn new(config: &PollConfig) -> crate::error::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| AquaError::config_error(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            store_url: config.store_url.clone(),
        })
    }

    /// The store URL with a uniqueness token appended.
    fn cache_busted_url(&self) -> String {
        let token = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let separator = if self.store_url.contains('?') { '&' } else { '?' };
        format!("{}{}t={}", self.store_url, separator, token)
    }
}

#[async_trait]
impl FetchSnapshot for SnapshotFetcher {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let url = self.cache_busted_url();
        debug!("fetching snapshot from {}", url);

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .header(reqwest::header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| FetchError::unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::StoreError(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::unreachable(format!("failed to read body: {}", e)))?;

        Snapshot::from_json(&body)
    }
}
