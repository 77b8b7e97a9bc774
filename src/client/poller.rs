//! Repeating-fetch lifecycle and observable poll state.
//!
//! The poller owns a repeating timer plus on-demand refresh triggers, both
//! funneled through a single in-flight gate so at most one fetch is
//! outstanding per poller regardless of trigger source. State updates are
//! applied in fetch-completion order; since only one fetch is ever in
//! flight, no reordering hazard exists.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::client::fetcher::{FetchSnapshot, SnapshotFetcher};
use crate::config::PollConfig;
use crate::error::FetchError;
use crate::quality::{Snapshot, WaterReport};

/// The poller's externally observable state.
///
/// `last_error` and `last_report` are retained independently: a fetch
/// failure never erases the previous successful report, so a consumer can
/// show stale-but-known readings alongside an error indicator instead of
/// blanking the screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PollState {
    /// The most recent successfully fetched and classified snapshot.
    pub last_report: Option<WaterReport>,
    /// The error from the most recent failed fetch, cleared on success.
    pub last_error: Option<FetchError>,
    /// True for the duration of any fetch, timer-driven or manual.
    pub is_refreshing: bool,
}

impl PollState {
    /// True until the first fetch has completed, success or failure.
    ///
    /// A presentation layer should render a loading indicator in this
    /// state, never an error.
    pub fn is_first_load(&self) -> bool {
        self.last_report.is_none() && self.last_error.is_none()
    }
}

type SharedFetch = Shared<BoxFuture<'static, ()>>;

struct PollerInner {
    fetcher: Arc<dyn FetchSnapshot>,
    state_tx: watch::Sender<PollState>,
    stopped: AtomicBool,
    in_flight: Mutex<Option<SharedFetch>>,
}

impl PollerInner {
    /// Join the in-flight fetch, or start a new one if none is running.
    ///
    /// Concurrent callers all await the same shared attempt and observe the
    /// same resulting state, so repeated manual refreshes issue exactly one
    /// network call.
    async fn run_fetch(this: &Arc<Self>) {
        let attempt = {
            let mut in_flight = this
                .in_flight
                .lock()
                .expect("poller in-flight gate poisoned");
            match in_flight.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let inner = Arc::clone(this);
                    let attempt: SharedFetch = async move {
                        if inner.stopped.load(Ordering::SeqCst) {
                            inner.clear_in_flight();
                            return;
                        }
                        inner.state_tx.send_modify(|state| state.is_refreshing = true);
                        let result = inner.fetcher.fetch().await;
                        inner.apply(result);
                        inner.clear_in_flight();
                    }
                    .boxed()
                    .shared();
                    *in_flight = Some(attempt.clone());
                    attempt
                }
            }
        };
        attempt.await;
    }

    fn clear_in_flight(&self) {
        *self
            .in_flight
            .lock()
            .expect("poller in-flight gate poisoned") = None;
    }

    /// Apply a completed fetch to the observable state.
    ///
    /// The stopped flag is re-checked inside the state update so a result
    /// arriving after `stop()` is discarded wholesale.
    fn apply(&self, result: Result<Snapshot, FetchError>) {
        self.state_tx.send_modify(|state| {
            if self.stopped.load(Ordering::SeqCst) {
                return;
            }
            state.is_refreshing = false;
            match result {
                Ok(snapshot) => {
                    debug!(timestamp = %snapshot.timestamp, "snapshot fetched");
                    state.last_report = Some(WaterReport::from_snapshot(&snapshot));
                    state.last_error = None;
                }
                Err(err) => {
                    warn!("fetch failed: {}", err);
                    state.last_error = Some(err);
                    // last_report is deliberately left untouched
                }
            }
        });
    }
}

/// Drives the fetcher on a fixed interval and exposes the latest state.
///
/// Lifecycle is `Idle -> Polling -> Stopped`: [`Poller::start`] performs an
/// immediate fetch and arms the timer, [`Poller::stop`] cancels the timer
/// and discards any in-flight result. A stopped poller cannot be restarted.
pub struct Poller {
    inner: Arc<PollerInner>,
    interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    /// Create a poller over any snapshot source.
    pub fn new(fetcher: Arc<dyn FetchSnapshot>, poll_interval: Duration) -> Self {
        let (state_tx, _) = watch::channel(PollState::default());
        Self {
            inner: Arc::new(PollerInner {
                fetcher,
                state_tx,
                stopped: AtomicBool::new(false),
                in_flight: Mutex::new(None),
            }),
            interval: poll_interval,
            timer: Mutex::new(None),
        }
    }

    /// Create a poller backed by an HTTP [`SnapshotFetcher`].
    pub fn from_config(config: &PollConfig) -> crate::error::Result<Self> {
        let fetcher = SnapshotFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher), config.poll_interval()))
    }

    /// A copy of the current poll state.
    pub fn state(&self) -> PollState {
        self.inner.state_tx.borrow().clone()
    }

    /// Subscribe to every state change.
    ///
    /// Preferred over polling [`Poller::state`]: transient states such as a
    /// brief `is_refreshing` window are otherwise easy to miss.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.inner.state_tx.subscribe()
    }

    /// Begin polling: one immediate fetch, then a repeating timer.
    ///
    /// Calling `start` on a poller that is already polling or has been
    /// stopped is a no-op.
    pub fn start(&self) {
        let mut timer = self.timer.lock().expect("poller timer handle poisoned");
        if timer.is_some() {
            warn!("poller already started");
            return;
        }
        if self.inner.stopped.load(Ordering::SeqCst) {
            warn!("cannot start a stopped poller");
            return;
        }

        let inner = Arc::clone(&self.inner);
        let interval = self.interval;
        *timer = Some(tokio::spawn(async move {
            PollerInner::run_fetch(&inner).await;

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately and is already covered
            // by the fetch above.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if inner.stopped.load(Ordering::SeqCst) {
                    break;
                }
                PollerInner::run_fetch(&inner).await;
            }
        }));
        debug!("poller started with {:?} interval", interval);
    }

    /// Fetch now, independent of the timer's phase.
    ///
    /// If a fetch is already in flight the call coalesces into it instead
    /// of issuing a second request; either way the returned future resolves
    /// once the shared attempt has completed and its state update is
    /// visible. The timer is not reset: the next tick still fires on its
    /// original schedule. A no-op after `stop`.
    pub async fn refresh(&self) {
        if self.inner.stopped.load(Ordering::SeqCst) {
            return;
        }
        PollerInner::run_fetch(&self.inner).await;
    }

    /// Stop polling. The state is retained but no longer updated; a fetch
    /// already in flight completes but its result is discarded.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        if let Some(handle) = self
            .timer
            .lock()
            .expect("poller timer handle poisoned")
            .take()
        {
            handle.abort();
        }
        // A discarded in-flight fetch can no longer clear the flag itself.
        self.inner
            .state_tx
            .send_modify(|state| state.is_refreshing = false);
        debug!("poller stopped");
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }
}
