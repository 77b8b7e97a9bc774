//! End-to-end pipeline tests over the in-process snapshot store.

use aquawatch::{
    store, Band, FetchError, FetchSnapshot, PollConfig, Poller, Producer, ProducerConfig,
    SimulatedSource, Snapshot, SnapshotFetcher,
};

async fn put_blob(url: &str, body: &str) {
    let status = reqwest::Client::new()
        .put(url)
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("store should accept writes")
        .status();
    assert!(status.is_success());
}

fn poll_config(url: &str) -> PollConfig {
    PollConfig::new(url)
        .with_poll_interval_ms(60_000)
        .with_fetch_timeout_ms(2_000)
}

/// Producer writes a clean snapshot, the poller classifies it all-Good;
/// the next write degrades every metric and the poller follows.
#[tokio::test]
async fn test_end_to_end_classification() {
    let store = store::serve("127.0.0.1:0").await.unwrap();
    let url = store.blob_url();

    put_blob(
        &url,
        r#"{"turbidity":"2.10","pH":"7.40","tds":"250.00","timestamp":"2024-01-01T00:00:00Z"}"#,
    )
    .await;

    let poller = Poller::from_config(&poll_config(&url)).unwrap();
    poller.refresh().await;

    let state = poller.state();
    assert!(state.last_error.is_none());
    let report = state.last_report.expect("first fetch should succeed");
    assert_eq!(report.turbidity.band, Band::Good);
    assert_eq!(report.ph.band, Band::Good);
    assert_eq!(report.tds.band, Band::Good);
    assert_eq!(report.timestamp, "2024-01-01T00:00:00Z");

    put_blob(
        &url,
        r#"{"turbidity":"6.00","pH":"9.00","tds":"600.00","timestamp":"2024-01-01T00:00:10Z"}"#,
    )
    .await;
    poller.refresh().await;

    let state = poller.state();
    assert!(state.last_error.is_none());
    let report = state.last_report.unwrap();
    assert_eq!(report.turbidity.band, Band::Critical);
    assert_eq!(report.ph.band, Band::Critical);
    assert_eq!(report.tds.band, Band::Critical);
    assert_eq!(report.timestamp, "2024-01-01T00:00:10Z");
}

/// A malformed overwrite surfaces as an error while the previous report is
/// retained unchanged.
#[tokio::test]
async fn test_malformed_snapshot_retains_previous_report() {
    let store = store::serve("127.0.0.1:0").await.unwrap();
    let url = store.blob_url();

    put_blob(
        &url,
        r#"{"turbidity":"3.2","pH":"7.1","tds":"120","timestamp":"T1"}"#,
    )
    .await;

    let poller = Poller::from_config(&poll_config(&url)).unwrap();
    poller.refresh().await;
    let good_report = poller.state().last_report.expect("first fetch should succeed");

    put_blob(
        &url,
        r#"{"turbidity":"abc","pH":"7.0","tds":"100","timestamp":"T"}"#,
    )
    .await;
    poller.refresh().await;

    let state = poller.state();
    assert!(matches!(
        state.last_error,
        Some(FetchError::MalformedSnapshot(_))
    ));
    assert_eq!(state.last_report, Some(good_report));
}

/// Before the producer's first write the store answers 404, which the
/// poller records as a store error with no report.
#[tokio::test]
async fn test_missing_blob_is_store_error() {
    let store = store::serve("127.0.0.1:0").await.unwrap();

    let poller = Poller::from_config(&poll_config(&store.blob_url())).unwrap();
    poller.refresh().await;

    let state = poller.state();
    assert_eq!(state.last_error, Some(FetchError::StoreError(404)));
    assert!(state.last_report.is_none());
}

/// What the producer publishes is exactly what a fetcher reads back.
#[tokio::test]
async fn test_producer_to_fetcher_round_trip() {
    let store = store::serve("127.0.0.1:0").await.unwrap();
    let url = store.blob_url();

    let mut producer = Producer::new(SimulatedSource::with_seed(42), ProducerConfig::new(&url));
    let published = producer.tick().await;

    let fetcher = SnapshotFetcher::new(&poll_config(&url)).unwrap();
    let fetched: Snapshot = fetcher.fetch().await.unwrap();
    assert_eq!(fetched, published);
}

/// Fetches are cache-busted: two consecutive fetches observe two
/// consecutive overwrites.
#[tokio::test]
async fn test_consecutive_fetches_observe_overwrites() {
    let store = store::serve("127.0.0.1:0").await.unwrap();
    let url = store.blob_url();
    let fetcher = SnapshotFetcher::new(&poll_config(&url)).unwrap();

    put_blob(&url, r#"{"turbidity":"1.00","pH":"7.00","tds":"50.00","timestamp":"T1"}"#).await;
    assert_eq!(fetcher.fetch().await.unwrap().timestamp, "T1");

    put_blob(&url, r#"{"turbidity":"1.00","pH":"7.00","tds":"50.00","timestamp":"T2"}"#).await;
    assert_eq!(fetcher.fetch().await.unwrap().timestamp, "T2");
}
