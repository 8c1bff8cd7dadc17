//! # Feed Sweep
//!
//! A feed aggregation pipeline that fetches a configured list of syndication
//! sources (RSS 2.0, Atom, RDF/RSS 1.0), normalizes their entries into one
//! article shape, and writes a single aggregated JSON snapshot.
//!
//! ## Features
//!
//! - Concurrent fetching with bounded parallelism (batches of 8 by default)
//! - Retry with linear backoff on any per-source failure
//! - Failure isolation: one broken source never aborts the run
//! - Uniform article records across RSS 2.0, Atom, and RDF schemas
//! - Deterministic output ordering regardless of network timing
//!
//! ## Usage
//!
//! ```sh
//! feed_sweep -f feeds.json -o raw_feeds.json
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Loading**: Read the source list from the feeds file
//! 2. **Fetching**: Fetch each batch of sources concurrently, with retries
//! 3. **Normalizing**: Map each feed document onto uniform article records
//! 4. **Aggregating**: Combine per-source results into one report
//! 5. **Output**: Write the report JSON and log a run summary

use std::error::Error;

use chrono::Utc;
use clap::Parser;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cli;
mod config;
mod fetch;
mod models;
mod normalize;
mod outputs;
mod progress;
mod scheduler;
mod xml;

use cli::Cli;
use fetch::HttpTransport;
use progress::LogObserver;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("feed_sweep starting up");

    let args = Cli::parse();
    debug!(?args.feeds, ?args.output, "Parsed CLI arguments");

    // ---- Load sources ----
    let sources = config::load_sources(&args.feeds).await?;
    if sources.is_empty() {
        warn!(path = %args.feeds.display(), "No sources configured; the report will be empty");
    }

    let options = args.fetch_options();
    info!(
        concurrency = options.concurrency,
        timeout_ms = options.request_timeout.as_millis() as u64,
        max_retries = options.max_retries,
        "Fetch options"
    );

    // ---- Fetch all sources in batches ----
    let transport = HttpTransport::new(&options)?;
    let results = scheduler::run_all(&transport, &sources, &options, &LogObserver).await;

    // ---- Aggregate and write the report ----
    let report = aggregate::aggregate(results, Utc::now());
    info!(
        feeds = report.feed_count,
        succeeded = report.success_count,
        articles = report.article_count,
        "Aggregated results"
    );

    outputs::json::write_report(&report, &args.output).await?;

    // ---- Final summary ----
    let failed: Vec<_> = report
        .feeds
        .iter()
        .filter(|feed| feed.error.is_some())
        .collect();
    if !failed.is_empty() {
        warn!(count = failed.len(), "Sources failed this run");
        for feed in &failed {
            warn!(
                id = %feed.id,
                name = %feed.name_zh,
                error = %feed.error.as_deref().unwrap_or(""),
                "Source failed"
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        succeeded = report.success_count,
        of = report.feed_count,
        articles = report.article_count,
        "Execution complete"
    );

    Ok(())
}
