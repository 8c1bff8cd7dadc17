//! Command-line interface definitions.
//!
//! All options carry defaults and environment-variable fallbacks, so the
//! binary runs with no arguments next to a `feeds.json`.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{
    DEFAULT_BATCH_DELAY_MS, DEFAULT_CONCURRENCY, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF_MS,
    DEFAULT_TIMEOUT_MS, FetchOptions,
};

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Defaults: read ./feeds.json, write ./raw_feeds.json
/// feed_sweep
///
/// # Custom paths and a tighter timeout
/// feed_sweep -f sources/feeds.json -o out/raw_feeds.json --timeout-ms 10000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the JSON file listing feed sources
    #[arg(short, long, env = "FEED_SWEEP_FEEDS", default_value = "feeds.json")]
    pub feeds: PathBuf,

    /// Path the aggregate JSON report is written to
    #[arg(short, long, env = "FEED_SWEEP_OUTPUT", default_value = "raw_feeds.json")]
    pub output: PathBuf,

    /// Number of sources fetched concurrently per batch
    #[arg(long, env = "FEED_SWEEP_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "FEED_SWEEP_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Retries after a failed attempt
    #[arg(long, env = "FEED_SWEEP_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Backoff multiplier in milliseconds; the sleep before retry n is n times this
    #[arg(long, env = "FEED_SWEEP_RETRY_BACKOFF_MS", default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    pub retry_backoff_ms: u64,

    /// Pause between batches in milliseconds
    #[arg(long, env = "FEED_SWEEP_BATCH_DELAY_MS", default_value_t = DEFAULT_BATCH_DELAY_MS)]
    pub batch_delay_ms: u64,
}

impl Cli {
    /// Collect the pipeline tunables into [`FetchOptions`].
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            concurrency: self.concurrency,
            request_timeout: Duration::from_millis(self.timeout_ms),
            max_retries: self.max_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            batch_delay: Duration::from_millis(self.batch_delay_ms),
        }
    }
}
