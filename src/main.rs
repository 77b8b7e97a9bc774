//! Aquawatch - Water Quality Telemetry Binary
//!
//! Command-line front end for the polling client, the snapshot producer,
//! and a self-contained demo pipeline.

use std::time::Duration;

use anyhow::Context;
use aquawatch::{
    store, Band, Metric, PollConfig, PollState, Poller, Producer, ProducerConfig, SimulatedSource,
    SnapshotFetcher, WaterReport, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_PRODUCE_INTERVAL_MS,
};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "aquawatch")]
#[command(about = "Water quality telemetry: poll, classify, and publish sensor snapshots")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the store continuously and render classified readings
    Watch(WatchArgs),

    /// Fetch and classify a single snapshot, then exit
    Fetch(FetchArgs),

    /// Generate simulated snapshots and publish them to the store
    Produce(ProduceArgs),

    /// Run store, producer, and watcher together in one process
    Demo(DemoArgs),
}

#[derive(Args)]
struct WatchArgs {
    /// URL of the snapshot blob
    store_url: String,

    /// Polling interval in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    interval: u64,

    /// Per-fetch timeout in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_FETCH_TIMEOUT_MS)]
    timeout: u64,
}

#[derive(Args)]
struct FetchArgs {
    /// URL of the snapshot blob
    store_url: String,

    /// Per-fetch timeout in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_FETCH_TIMEOUT_MS)]
    timeout: u64,

    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[derive(Args)]
struct ProduceArgs {
    /// URL accepting PUT overwrites of the blob
    put_url: String,

    /// Generation interval in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_PRODUCE_INTERVAL_MS)]
    interval: u64,

    /// Seed for the simulated readings (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct DemoArgs {
    /// Port for the in-process store (0 picks a free port)
    #[arg(short, long, default_value_t = 0)]
    port: u16,

    /// Polling interval in milliseconds
    #[arg(long, default_value_t = 1_000)]
    poll_interval: u64,

    /// Producer interval in milliseconds
    #[arg(long, default_value_t = 2_000)]
    produce_interval: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match &cli.command {
        Commands::Watch(args) => watch_command(args).await,
        Commands::Fetch(args) => fetch_command(args).await,
        Commands::Produce(args) => produce_command(args).await,
        Commands::Demo(args) => demo_command(args).await,
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn watch_command(args: &WatchArgs) -> anyhow::Result<()> {
    let config = PollConfig::new(&args.store_url)
        .with_poll_interval_ms(args.interval)
        .with_fetch_timeout_ms(args.timeout);
    let poller = Poller::from_config(&config).context("failed to build poller")?;

    info!("watching {} every {}ms", args.store_url, args.interval);
    run_watch_loop(&poller).await;
    Ok(())
}

/// Subscribe to poll state and re-render on every change until Ctrl-C.
async fn run_watch_loop(poller: &Poller) {
    let mut states = poller.subscribe();
    poller.start();
    render(&poller.state());

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow().clone();
                render(&state);
            }
            _ = tokio::signal::ctrl_c() => {
                poller.stop();
                break;
            }
        }
    }
}

async fn fetch_command(args: &FetchArgs) -> anyhow::Result<()> {
    use aquawatch::FetchSnapshot;

    let config = PollConfig::new(&args.store_url).with_fetch_timeout_ms(args.timeout);
    let fetcher = SnapshotFetcher::new(&config).context("failed to build fetcher")?;
    let snapshot = fetcher
        .fetch()
        .await
        .context("failed to fetch a snapshot")?;
    let report = WaterReport::from_snapshot(&snapshot);

    match args.format.as_str() {
        "json" => println!("{}", snapshot.to_json()),
        "pretty" => print_report(&report),
        other => anyhow::bail!("unsupported format: {}. Use 'json' or 'pretty'", other),
    }
    Ok(())
}

async fn produce_command(args: &ProduceArgs) -> anyhow::Result<()> {
    let source = match args.seed {
        Some(seed) => SimulatedSource::with_seed(seed),
        None => SimulatedSource::new(),
    };
    let config = ProducerConfig::new(&args.put_url).with_interval_ms(args.interval);
    let mut producer = Producer::new(source, config);

    info!("publishing to {} every {}ms", args.put_url, args.interval);
    tokio::select! {
        _ = producer.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("producer stopped");
        }
    }
    Ok(())
}

async fn demo_command(args: &DemoArgs) -> anyhow::Result<()> {
    let store = store::serve(&format!("127.0.0.1:{}", args.port))
        .await
        .context("failed to start in-process store")?;
    let blob_url = store.blob_url();
    println!("Snapshot store: {}", blob_url);

    let producer_config =
        ProducerConfig::new(&blob_url).with_interval_ms(args.produce_interval);
    let producer_task = tokio::spawn(async move {
        Producer::new(SimulatedSource::new(), producer_config)
            .run()
            .await;
    });

    let poll_config = PollConfig::new(&blob_url).with_poll_interval_ms(args.poll_interval);
    let poller = Poller::from_config(&poll_config).context("failed to build poller")?;
    run_watch_loop(&poller).await;

    producer_task.abort();
    Ok(())
}

/// Console rendering of the poll state: the presentation adapter.
fn render(state: &PollState) {
    println!();
    if state.is_first_load() {
        println!(
            "Loading sensor data{}",
            if state.is_refreshing { "..." } else { "" }
        );
        return;
    }

    if let Some(err) = &state.last_error {
        println!("! {}", err);
        if state.last_report.is_some() {
            println!("  showing last known readings:");
        }
    }

    if let Some(report) = &state.last_report {
        print_report(report);
    }

    if state.is_refreshing {
        println!("(refreshing...)");
    }
}

fn print_report(report: &WaterReport) {
    println!("Water Quality Report ({})", report.timestamp);
    print_reading(Metric::Turbidity, report.turbidity.value, report.turbidity.band);
    print_reading(Metric::Ph, report.ph.value, report.ph.band);
    print_reading(Metric::Tds, report.tds.value, report.tds.band);
}

fn print_reading(metric: Metric, value: f64, band: Band) {
    println!(
        "  {:<16} {:>8.2}  [{:<4}]  ({})",
        metric.label(),
        value,
        band.symbol(),
        metric.threshold_hint()
    );
}
