//! Data models for feed sources, normalized articles, and the aggregate report.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FeedSource`]: One configured syndication source, loaded from the feeds file
//! - [`Article`]: A single feed entry after normalization
//! - [`FeedResult`]: The terminal outcome of fetching one source
//! - [`FeedSummary`], [`FlatArticle`], [`AggregateReport`]: The report payload
//!
//! The report is consumed by external tooling that expects camelCase field
//! names (`fetchedAt`, `nameZh`, `feedNameZh`, ...), so every serializable
//! struct pins its wire names with `#[serde(rename_all = "camelCase")]`.

use serde::{Deserialize, Serialize};

/// One configured feed source, as read from the feeds file.
///
/// Sources are loaded once at startup and never mutated; the pipeline only
/// reads them and copies their metadata onto results and articles.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedSource {
    /// Unique identifier, used to correlate articles with their source.
    pub id: String,
    /// The feed URL (RSS 2.0, Atom, or RDF).
    pub url: String,
    /// Display name in the source's own language.
    pub name: String,
    /// Chinese display name.
    pub name_zh: String,
    /// Editorial category (e.g. "tech", "finance").
    pub category: String,
    /// Accent color used by downstream presentation.
    pub color: String,
    /// Language code of the feed content.
    pub lang: String,
}

/// One normalized feed entry.
///
/// Every field degrades to an empty string rather than failing: a partially
/// populated entry is preserved, not discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Entry title, whitespace-trimmed.
    pub title: String,
    /// Resolved entry link; empty when the feed carries none.
    pub link: String,
    /// Publication date exactly as the feed printed it. No parsing is
    /// attempted; downstream consumers decide how to interpret it.
    pub pub_date: String,
    /// HTML-stripped description, truncated to 500 characters.
    pub summary: String,
}

/// The terminal outcome of fetching one source.
///
/// Exactly one fetch invocation produces one `FeedResult`; retries happen
/// inside that invocation and never surface as separate results. A failed
/// fetch carries empty `articles` and the final attempt's error message.
#[derive(Debug, Clone)]
pub struct FeedResult {
    /// The source this result belongs to.
    pub source: FeedSource,
    /// Normalized articles; empty on failure.
    pub articles: Vec<Article>,
    /// Terminal error message after retries were exhausted, if any.
    pub error: Option<String>,
}

impl FeedResult {
    /// A successful result carrying the normalized articles.
    pub fn ok(source: FeedSource, articles: Vec<Article>) -> Self {
        Self {
            source,
            articles,
            error: None,
        }
    }

    /// A failed result carrying the last error's message.
    pub fn failed(source: FeedSource, error: String) -> Self {
        Self {
            source,
            articles: Vec::new(),
            error: Some(error),
        }
    }

    /// Whether the fetch ultimately succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-source summary row in the aggregate report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    pub id: String,
    pub name: String,
    pub name_zh: String,
    pub category: String,
    pub color: String,
    pub lang: String,
    /// Number of articles this source contributed.
    pub article_count: usize,
    /// Terminal fetch error, `null` on success.
    pub error: Option<String>,
}

/// One article in the flattened report list, stamped with the metadata of
/// the source it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlatArticle {
    pub feed_id: String,
    pub feed_name: String,
    pub feed_name_zh: String,
    pub category: String,
    pub color: String,
    pub lang: String,
    pub title: String,
    pub link: String,
    pub pub_date: String,
    pub summary: String,
}

/// The top-level output of one pipeline run.
///
/// Built once after every source has resolved, then handed to the report
/// writer. Both `feeds` and `articles` preserve the configured source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    /// RFC 3339 UTC timestamp of run completion.
    pub fetched_at: String,
    /// Number of configured sources.
    pub feed_count: usize,
    /// Number of sources that resolved without an error.
    pub success_count: usize,
    /// Total articles across all sources.
    pub article_count: usize,
    /// Per-source summaries, in source order.
    pub feeds: Vec<FeedSummary>,
    /// Every article from every source, in source order.
    pub articles: Vec<FlatArticle>,
}
