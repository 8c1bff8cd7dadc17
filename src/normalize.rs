//! Feed schema normalization.
//!
//! Three document shapes are recognized and mapped onto one article record:
//!
//! | Shape     | Root      | Entries                                   |
//! |-----------|-----------|-------------------------------------------|
//! | RSS 2.0   | `rss`     | `channel` > `item`                        |
//! | Atom      | `feed`    | `entry`                                   |
//! | RDF/RSS 1 | `rdf:RDF` | `item` (siblings of the channel)          |
//!
//! Dispatch validates presence before reading children: an `rss` root
//! without a `channel` matches nothing. Anything else is an unrecognized
//! format, the only hard failure here. Per-entry extraction never fails:
//! missing or malformed fields degrade to empty strings so that a partially
//! usable entry survives.
//!
//! This module is pure and synchronous. It owns no I/O and is deterministic
//! for a given tree.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::Article;
use crate::xml::XmlElement;

/// Summaries are cut to this many characters after tag stripping.
pub const SUMMARY_MAX_CHARS: usize = 500;

// Any angle-bracketed span counts as markup, not just well-known tags.
static MARKUP_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Date fields probed in order; the first with non-empty text wins.
const DATE_FIELDS: [&str; 4] = ["pubDate", "published", "updated", "dc:date"];

/// Summary candidates probed in order.
const SUMMARY_FIELDS: [&str; 3] = ["description", "summary", "content"];

/// The document matched none of the recognized root shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("unrecognized feed format (expected RSS 2.0, Atom, or RDF)")]
    UnrecognizedFormat,
}

/// The recognized feed shapes, holding the element that owns the entries.
#[derive(Debug, Clone, Copy)]
enum FeedKind<'a> {
    /// Entries live under the channel element.
    Rss2 { channel: &'a XmlElement },
    /// Entries live directly under the feed root.
    Atom { feed: &'a XmlElement },
    /// Entries are siblings of the channel, directly under the root.
    Rdf { root: &'a XmlElement },
}

impl<'a> FeedKind<'a> {
    /// Ordered shape predicates; first match wins.
    fn detect(root: &'a XmlElement) -> Option<Self> {
        if root.name == "rss" {
            return root
                .child("channel")
                .map(|channel| FeedKind::Rss2 { channel });
        }
        if root.name == "feed" {
            return Some(FeedKind::Atom { feed: root });
        }
        if root.name == "rdf:RDF" {
            return Some(FeedKind::Rdf { root });
        }
        None
    }

    /// Entry elements in document order. Zero entries is a valid feed.
    fn entries(self) -> Vec<&'a XmlElement> {
        match self {
            FeedKind::Rss2 { channel } => channel.children_named("item").collect(),
            FeedKind::Atom { feed } => feed.children_named("entry").collect(),
            FeedKind::Rdf { root } => root.children_named("item").collect(),
        }
    }
}

/// Normalize one parsed feed document into article records.
///
/// Fails only when the root shape is unrecognized; individual entries are
/// extracted independently and never abort the document.
pub fn normalize(root: &XmlElement) -> Result<Vec<Article>, NormalizeError> {
    let kind = FeedKind::detect(root).ok_or(NormalizeError::UnrecognizedFormat)?;
    Ok(kind.entries().into_iter().map(extract_article).collect())
}

fn extract_article(entry: &XmlElement) -> Article {
    Article {
        title: extract_title(entry),
        link: extract_link(entry),
        pub_date: extract_pub_date(entry),
        summary: extract_summary(entry),
    }
}

// Direct character data of the title element. Atom titles are often wrapped
// (`type="html"` or similar); the attribute does not matter for the text
// payload. A title made only of nested markup yields the empty string.
fn extract_title(entry: &XmlElement) -> String {
    entry
        .child("title")
        .map(|title| title.text.trim().to_string())
        .unwrap_or_default()
}

// Three link encodings:
//  (a) a single bare element:         <link>https://...</link>
//  (b) several Atom link elements:    pick rel="alternate", else the first href
//  (c) a single attributed element:   <link href="https://..."/>
fn extract_link(entry: &XmlElement) -> String {
    let links: Vec<&XmlElement> = entry.children_named("link").collect();
    match links.as_slice() {
        [] => String::new(),
        [single] => {
            if !single.has_attributes() && !single.has_element_children() {
                single.text.clone()
            } else {
                single.attr("href").unwrap_or_default().to_string()
            }
        }
        many => many
            .iter()
            .find(|link| link.attr("rel") == Some("alternate"))
            .and_then(|link| link.attr("href"))
            .or_else(|| many[0].attr("href"))
            .unwrap_or_default()
            .to_string(),
    }
}

// First non-empty of the RSS, Atom, and RDF date fields. The value stays an
// opaque string; date parsing belongs to consumers.
fn extract_pub_date(entry: &XmlElement) -> String {
    DATE_FIELDS
        .iter()
        .filter_map(|name| entry.child(name))
        .map(|field| field.text.trim())
        .find(|text| !text.is_empty())
        .unwrap_or_default()
        .to_string()
}

// First present candidate decides the summary. A structured candidate (one
// carrying attributes or nested elements) resolves to the empty string
// without falling through to later names; only an entirely empty candidate
// lets the next one be probed. Plain text is stripped of markup spans,
// trimmed, and cut to `SUMMARY_MAX_CHARS`.
fn extract_summary(entry: &XmlElement) -> String {
    for name in SUMMARY_FIELDS {
        let Some(candidate) = entry.child(name) else {
            continue;
        };
        if candidate.has_attributes() || candidate.has_element_children() {
            return String::new();
        }
        let text = candidate.text.trim();
        if text.is_empty() {
            continue;
        }
        let stripped = MARKUP_SPAN.replace_all(text, "");
        return stripped.trim().chars().take(SUMMARY_MAX_CHARS).collect();
    }
    String::new()
}
