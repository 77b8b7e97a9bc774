//! Polling client: cache-busted snapshot fetching and the poller that
//! drives it on a timer.

pub mod fetcher;
pub mod poller;

pub use fetcher::{FetchSnapshot, SnapshotFetcher};
pub use poller::{PollState, Poller};
