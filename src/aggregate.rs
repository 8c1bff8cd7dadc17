//! Aggregation of per-source results into the report payload.
//!
//! Runs once, after every source has resolved. The report is immutable
//! after construction; the completion timestamp is supplied by the caller
//! so this stays a pure function of its inputs.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::{AggregateReport, FeedResult, FeedSummary, FlatArticle};

/// Build the aggregate report from the ordered per-source results.
///
/// `success_count` counts results without an error (a zero-article success
/// counts); `articles` flattens every source's articles in source order,
/// stamping each with its source's metadata.
pub fn aggregate(results: Vec<FeedResult>, fetched_at: DateTime<Utc>) -> AggregateReport {
    let feed_count = results.len();
    let success_count = results.iter().filter(|result| result.is_success()).count();
    let article_count = results.iter().map(|result| result.articles.len()).sum();

    let mut feeds = Vec::with_capacity(feed_count);
    let mut articles = Vec::with_capacity(article_count);

    for result in results {
        let source = &result.source;
        feeds.push(FeedSummary {
            id: source.id.clone(),
            name: source.name.clone(),
            name_zh: source.name_zh.clone(),
            category: source.category.clone(),
            color: source.color.clone(),
            lang: source.lang.clone(),
            article_count: result.articles.len(),
            error: result.error.clone(),
        });

        for article in result.articles {
            articles.push(FlatArticle {
                feed_id: source.id.clone(),
                feed_name: source.name.clone(),
                feed_name_zh: source.name_zh.clone(),
                category: source.category.clone(),
                color: source.color.clone(),
                lang: source.lang.clone(),
                title: article.title,
                link: article.link,
                pub_date: article.pub_date,
                summary: article.summary,
            });
        }
    }

    AggregateReport {
        fetched_at: fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        feed_count,
        success_count,
        article_count,
        feeds,
        articles,
    }
}
