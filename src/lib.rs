//! # Aquawatch - Water Quality Telemetry
//!
//! A minimal pull-based telemetry pipeline for water quality sensors. A
//! producer periodically overwrites a single JSON snapshot in a shared blob
//! store; polling clients fetch it with cache-busting, validate it, and
//! classify each reading against fixed safety thresholds.
//!
//! ## Features
//!
//! - **Polling client**: cache-busted fetches on a fixed interval, with
//!   coalesced manual refresh and at most one in-flight request
//! - **Threshold classification**: turbidity, pH, and TDS mapped to
//!   Good/Warning/Critical bands
//! - **Failure-tolerant state**: fetch errors are recorded alongside, never
//!   instead of, the last known good readings
//! - **Producer**: simulated or real sensor readings published on a fixed
//!   cadence via full-overwrite PUT
//! - **In-process store**: an axum stand-in for the blob store, for demos
//!   and tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aquawatch::{PollConfig, Poller};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PollConfig::new("https://example.com/sensor-data.json");
//!     let poller = Poller::from_config(&config)?;
//!     let mut states = poller.subscribe();
//!     poller.start();
//!
//!     while states.changed().await.is_ok() {
//!         let state = states.borrow().clone();
//!         if let Some(report) = &state.last_report {
//!             println!("turbidity: {} [{}]", report.turbidity.value, report.turbidity.band);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod producer;
pub mod quality;
pub mod store;

// Re-export public API
pub use client::{FetchSnapshot, PollState, Poller, SnapshotFetcher};
pub use config::{PollConfig, ProducerConfig};
pub use error::{AquaError, FetchError, Result};
pub use producer::{Producer, ReadingSource, SimulatedSource};
pub use quality::{classify, Band, Metric, Reading, Snapshot, WaterReport};

/// The default polling interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;

/// The default producer cadence in milliseconds
pub const DEFAULT_PRODUCE_INTERVAL_MS: u64 = 10_000;

/// The default per-fetch timeout in milliseconds
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 3_000;
