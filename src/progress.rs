//! Per-source progress reporting.
//!
//! The pipeline reports fetch lifecycle events outward through the
//! [`ProgressObserver`] trait instead of logging directly from the fetch
//! path. The binary installs [`LogObserver`]; embedders and tests can
//! install their own implementations.

use tracing::{error, info, warn};

/// Lifecycle phase of one source fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The first attempt is about to start.
    Started,
    /// An attempt failed and a backoff sleep precedes the next one.
    Retrying,
    /// An attempt succeeded; the result is terminal.
    Succeeded,
    /// Retries are exhausted; the result is terminal.
    Failed,
}

/// One progress notification for one source.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Id of the source the event belongs to.
    pub source_id: String,
    pub phase: Phase,
    /// Attempt number the event refers to, 1-based.
    pub attempt: u32,
    /// Number of normalized articles; present on [`Phase::Succeeded`].
    pub article_count: Option<usize>,
    /// Failure message; present on [`Phase::Retrying`] and [`Phase::Failed`].
    pub error_message: Option<String>,
}

impl ProgressEvent {
    pub fn started(source_id: &str, attempt: u32) -> Self {
        Self {
            source_id: source_id.to_string(),
            phase: Phase::Started,
            attempt,
            article_count: None,
            error_message: None,
        }
    }

    pub fn retrying(source_id: &str, attempt: u32, error: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            phase: Phase::Retrying,
            attempt,
            article_count: None,
            error_message: Some(error.to_string()),
        }
    }

    pub fn succeeded(source_id: &str, attempt: u32, article_count: usize) -> Self {
        Self {
            source_id: source_id.to_string(),
            phase: Phase::Succeeded,
            attempt,
            article_count: Some(article_count),
            error_message: None,
        }
    }

    pub fn failed(source_id: &str, attempt: u32, error: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            phase: Phase::Failed,
            attempt,
            article_count: None,
            error_message: Some(error.to_string()),
        }
    }
}

/// Receiver of per-source progress events.
///
/// Implementations must be cheap and non-blocking; events are emitted from
/// inside the concurrent fetch path.
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Observer that forwards events to the `tracing` log stream.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn on_event(&self, event: ProgressEvent) {
        match event.phase {
            Phase::Started => {
                info!(source = %event.source_id, "Fetching feed");
            }
            Phase::Retrying => {
                warn!(
                    source = %event.source_id,
                    attempt = event.attempt,
                    error = %event.error_message.as_deref().unwrap_or(""),
                    "Feed fetch failed; retrying"
                );
            }
            Phase::Succeeded => {
                info!(
                    source = %event.source_id,
                    attempt = event.attempt,
                    articles = event.article_count.unwrap_or(0),
                    "Feed fetched"
                );
            }
            Phase::Failed => {
                error!(
                    source = %event.source_id,
                    attempt = event.attempt,
                    error = %event.error_message.as_deref().unwrap_or(""),
                    "Feed failed after retries"
                );
            }
        }
    }
}

/// Observer that drops every event.
#[derive(Debug, Default)]
pub struct NullObserver;

impl ProgressObserver for NullObserver {
    fn on_event(&self, _event: ProgressEvent) {}
}
