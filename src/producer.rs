//! Snapshot generation and best-effort publication to the store.

use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::config::ProducerConfig;
use crate::error::{AquaError, Result};
use crate::quality::Snapshot;

/// Source of raw sensor values, one sample per generation tick.
///
/// Implementations may read real hardware or simulate readings; the
/// producer does not care which.
pub trait ReadingSource: Send {
    /// Sample the current (turbidity, pH, TDS) triple.
    fn sample(&mut self) -> (f64, f64, f64);
}

/// Bounded-random readings matching the ranges of the field sensors:
/// turbidity 0-10 NTU, pH 6.0-9.0, TDS 0-1000 ppm.
#[derive(Debug, Default)]
pub struct SimulatedSource {
    rng: fastrand::Rng,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source with a fixed seed, for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl ReadingSource for SimulatedSource {
    fn sample(&mut self) -> (f64, f64, f64) {
        let turbidity = self.rng.f64() * 10.0;
        let ph = 6.0 + self.rng.f64() * 3.0;
        let tds = self.rng.f64() * 1000.0;
        (turbidity, ph, tds)
    }
}

/// Generates one snapshot per tick and overwrites the store with it.
pub struct Producer<S: ReadingSource> {
    source: S,
    http: reqwest::Client,
    config: ProducerConfig,
}

impl<S: ReadingSource> Producer<S> {
    pub fn new(source: S, config: ProducerConfig) -> Self {
        Self {
            source,
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Generate one self-consistent snapshot with the current timestamp.
    ///
    /// Values round to two decimals on the wire, so the generated snapshot
    /// is rounded the same way to stay equal to what a consumer reads back.
    pub fn generate(&mut self) -> Snapshot {
        let (turbidity, ph, tds) = self.source.sample();
        Snapshot {
            turbidity: round2(turbidity),
            ph: round2(ph),
            tds: round2(tds),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Overwrite the store with the given snapshot.
    pub async fn publish(&self, snapshot: &Snapshot) -> Result<()> {
        let response = self
            .http
            .put(&self.config.put_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(snapshot.to_json())
            .send()
            .await
            .map_err(|e| AquaError::store_write(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AquaError::store_write(format!("HTTP {}", status.as_u16())));
        }

        debug!(timestamp = %snapshot.timestamp, "snapshot published");
        Ok(())
    }

    /// Generate and publish one snapshot.
    pub async fn tick(&mut self) -> Snapshot {
        let snapshot = self.generate();
        // Best effort: only the latest value matters, so a failed write is
        // logged and the next tick proceeds on schedule.
        if let Err(err) = self.publish(&snapshot).await {
            warn!("snapshot write failed: {}", err);
        }
        snapshot
    }

    /// Run the generation loop until the task is cancelled.
    pub async fn run(&mut self) {
        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
