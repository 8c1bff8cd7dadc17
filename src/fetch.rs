//! Single-source fetching with bounded retry.
//!
//! The network seam is the [`FetchBody`] trait: one HTTP GET returning the
//! body text. [`HttpTransport`] is the production implementation over a
//! shared `reqwest` client; tests substitute scripted transports.
//!
//! [`fetch_source`] wraps one transport call per attempt in an explicit
//! bounded loop. Every failure class (connection error, timeout, non-2xx
//! status, XML syntax error, unrecognized feed shape) takes the same retry
//! path, and retries are separate attempts producing fresh results, never
//! mutations of an earlier one. No error escapes this module: a source
//! always resolves to exactly one [`FeedResult`].
//!
//! # Retry Schedule
//!
//! The sleep before retry *n* is `n * retry_backoff`. At the default 2000 ms
//! multiplier, a source that keeps failing waits 2 s after the first attempt
//! and 4 s after the second before its third and final attempt.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::config::FetchOptions;
use crate::models::{Article, FeedResult, FeedSource};
use crate::normalize::{self, NormalizeError};
use crate::progress::{ProgressEvent, ProgressObserver};
use crate::xml::{self, ParseError};

/// User-agent sent with every feed request.
pub const USER_AGENT: &str = concat!("feed-sweep/", env!("CARGO_PKG_VERSION"));

/// One attempt's failure. All variants are retried identically; the display
/// string of the last one becomes the terminal error of the source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u16),
    /// Connection failure or timeout.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The body is not well-formed XML.
    #[error(transparent)]
    Xml(#[from] ParseError),
    /// Well-formed XML matching none of the recognized feed shapes. A retry
    /// rarely helps here, but upstream documents are occasionally broken
    /// only transiently, so the waste is accepted.
    #[error(transparent)]
    Format(#[from] NormalizeError),
}

/// One HTTP GET of a feed body.
pub trait FetchBody {
    async fn fetch_body(&self, url: &str) -> Result<String, FetchError>;
}

/// Production transport over a shared `reqwest::Client` carrying the
/// user-agent and the per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(options: &FetchOptions) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.request_timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchBody for HttpTransport {
    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Fetch one source, retrying per the configured schedule.
///
/// Always returns a [`FeedResult`]: articles with `error: None` on success
/// at any attempt, empty articles with the last error's message once
/// retries are exhausted.
#[instrument(level = "debug", skip_all, fields(source = %source.id))]
pub async fn fetch_source<T: FetchBody>(
    transport: &T,
    source: &FeedSource,
    options: &FetchOptions,
    observer: &dyn ProgressObserver,
) -> FeedResult {
    let total_attempts = options.max_retries + 1;
    let mut last_error = String::new();

    for attempt in 1..=total_attempts {
        if attempt == 1 {
            observer.on_event(ProgressEvent::started(&source.id, attempt));
        }

        match fetch_once(transport, source).await {
            Ok(articles) => {
                observer.on_event(ProgressEvent::succeeded(&source.id, attempt, articles.len()));
                return FeedResult::ok(source.clone(), articles);
            }
            Err(error) => {
                last_error = error.to_string();
                if attempt < total_attempts {
                    let delay = backoff_delay(options.retry_backoff, attempt);
                    debug!(
                        source = %source.id,
                        attempt,
                        ?delay,
                        error = %last_error,
                        "Attempt failed; backing off"
                    );
                    observer.on_event(ProgressEvent::retrying(&source.id, attempt, &last_error));
                    sleep(delay).await;
                }
            }
        }
    }

    observer.on_event(ProgressEvent::failed(&source.id, total_attempts, &last_error));
    FeedResult::failed(source.clone(), last_error)
}

async fn fetch_once<T: FetchBody>(
    transport: &T,
    source: &FeedSource,
) -> Result<Vec<Article>, FetchError> {
    let body = transport.fetch_body(&source.url).await?;
    let tree = xml::parse_document(&body)?;
    Ok(normalize::normalize(&tree)?)
}

// Linear schedule: the n-th failed attempt waits n times the multiplier.
fn backoff_delay(multiplier: Duration, failed_attempt: u32) -> Duration {
    multiplier * failed_attempt
}
