//! Configuration for the polling client and producer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the polling client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// URL of the snapshot blob in the store
    pub store_url: String,
    /// Interval between timer-driven fetches, in milliseconds
    pub poll_interval_ms: u64,
    /// Per-attempt fetch timeout, in milliseconds
    pub fetch_timeout_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            store_url: String::new(),
            poll_interval_ms: crate::DEFAULT_POLL_INTERVAL_MS,
            fetch_timeout_ms: crate::DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl PollConfig {
    /// Create a configuration for the given store URL with default timings.
    pub fn new(store_url: impl Into<String>) -> Self {
        Self {
            store_url: store_url.into(),
            ..Default::default()
        }
    }

    /// Set the polling interval.
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the per-attempt fetch timeout.
    pub fn with_fetch_timeout_ms(mut self, ms: u64) -> Self {
        self.fetch_timeout_ms = ms;
        self
    }

    /// Polling interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Configuration for the snapshot producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Pre-authorized URL accepting PUT overwrites of the blob
    pub put_url: String,
    /// Interval between generation ticks, in milliseconds
    pub interval_ms: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            put_url: String::new(),
            interval_ms: crate::DEFAULT_PRODUCE_INTERVAL_MS,
        }
    }
}

impl ProducerConfig {
    /// Create a configuration for the given write URL with the default cadence.
    pub fn new(put_url: impl Into<String>) -> Self {
        Self {
            put_url: put_url.into(),
            ..Default::default()
        }
    }

    /// Set the generation interval.
    pub fn with_interval_ms(mut self, ms: u64) -> Self {
        self.interval_ms = ms;
        self
    }

    /// Generation interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
