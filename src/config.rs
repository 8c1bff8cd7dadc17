//! Pipeline configuration: tunable fetch parameters and source-list loading.
//!
//! The source list is a JSON array of feed descriptors (see `feeds.json`).
//! Loading performs light validation only: duplicate ids and unparseable
//! URLs are logged as warnings, never errors, so that one bad entry does not
//! keep the remaining sources from being fetched.

use std::collections::HashSet;
use std::error::Error;
use std::path::Path;
use std::time::Duration;

use tracing::{info, instrument, warn};
use url::Url;

use crate::models::FeedSource;

/// Default number of sources fetched concurrently per batch.
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 25_000;
/// Default number of retries after a failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Default backoff multiplier: retry *n* waits `n` times this long.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 2_000;
/// Default pause between batches.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 500;

/// Tunable parameters of one pipeline run.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Sources fetched concurrently per batch; also the batch size.
    pub concurrency: usize,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
    /// Retries after the first failed attempt (2 retries = 3 attempts).
    pub max_retries: u32,
    /// Backoff multiplier; the sleep before retry *n* is `n * retry_backoff`.
    pub retry_backoff: Duration,
    /// Pause inserted between consecutive batches.
    pub batch_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
        }
    }
}

/// Load the feed source list from a JSON file.
///
/// # Errors
///
/// Fails when the file cannot be read or is not a JSON array of source
/// descriptors. Per-source oddities (duplicate id, invalid URL) only warn.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn load_sources(path: impl AsRef<Path>) -> Result<Vec<FeedSource>, Box<dyn Error>> {
    let raw = tokio::fs::read_to_string(path.as_ref()).await?;
    let sources: Vec<FeedSource> = serde_json::from_str(&raw)?;

    let mut seen = HashSet::new();
    for source in &sources {
        if !seen.insert(source.id.as_str()) {
            warn!(id = %source.id, "Duplicate source id in feeds file");
        }
        if Url::parse(&source.url).is_err() {
            warn!(id = %source.id, url = %source.url, "Source URL does not parse");
        }
    }

    info!(count = sources.len(), "Loaded feed sources");
    Ok(sources)
}
