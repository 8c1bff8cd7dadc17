//! Batched concurrent execution of source fetches.
//!
//! Sources are partitioned into contiguous groups of `concurrency` (group
//! boundaries are purely positional). All fetches of one group run
//! concurrently and the group is joined as a whole: a slow member, retries
//! included, never blocks or cancels its siblings, but the next group does
//! not start until the current one has fully resolved. A fixed pause
//! between groups keeps request pressure below upstream throttling limits.
//!
//! Within a group the fetches race in real time; the join reassembles the
//! group's results positionally, so the returned sequence always matches
//! the input order regardless of network timing.

use futures::future::join_all;
use itertools::Itertools;
use tokio::time::sleep;
use tracing::info;

use crate::config::FetchOptions;
use crate::fetch::{FetchBody, fetch_source};
use crate::models::{FeedResult, FeedSource};
use crate::progress::ProgressObserver;

/// Fetch every source, batch by batch. Output order equals input order.
pub async fn run_all<T: FetchBody>(
    transport: &T,
    sources: &[FeedSource],
    options: &FetchOptions,
    observer: &dyn ProgressObserver,
) -> Vec<FeedResult> {
    let batch_size = options.concurrency.max(1);
    let batch_count = sources.len().div_ceil(batch_size);
    let mut results = Vec::with_capacity(sources.len());

    for (index, batch) in sources.chunks(batch_size).enumerate() {
        let members = batch.iter().map(|source| source.id.as_str()).join(", ");
        info!(
            batch = index + 1,
            of = batch_count,
            size = batch.len(),
            %members,
            "Fetching batch"
        );

        let batch_results = join_all(
            batch
                .iter()
                .map(|source| fetch_source(transport, source, options, observer)),
        )
        .await;
        results.extend(batch_results);

        if results.len() < sources.len() {
            sleep(options.batch_delay).await;
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::progress::NullObserver;
    use std::time::Duration;

    fn source(id: &str) -> FeedSource {
        FeedSource {
            id: id.to_string(),
            url: format!("https://feeds.example.com/{id}"),
            name: id.to_uppercase(),
            name_zh: id.to_string(),
            category: "tech".to_string(),
            color: "#123456".to_string(),
            lang: "en".to_string(),
        }
    }

    fn options(concurrency: usize) -> FetchOptions {
        FetchOptions {
            concurrency,
            ..FetchOptions::default()
        }
    }

    /// Serves a one-item feed titled after the request URL. Sources whose id
    /// ends in "bad" always fail; the per-source artificial delay makes
    /// completion order differ from input order.
    struct StaggeredTransport {
        delay_step: Duration,
    }

    impl FetchBody for StaggeredTransport {
        async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
            // Later sources answer sooner.
            let position = url
                .rsplit('/')
                .next()
                .and_then(|id| id.strip_prefix('s'))
                .and_then(|n| n.parse::<u32>().ok())
                .unwrap_or(0);
            sleep(self.delay_step * (20u32.saturating_sub(position))).await;

            if url.ends_with("bad") {
                return Err(FetchError::Http(500));
            }
            Ok(format!(
                "<rss><channel><item><title>{url}</title></item></channel></rss>"
            ))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn preserves_input_order_across_batches() {
        let sources: Vec<FeedSource> = (0..10).map(|i| source(&format!("s{i}"))).collect();
        let transport = StaggeredTransport {
            delay_step: Duration::from_millis(10),
        };

        let results = run_all(&transport, &sources, &options(8), &NullObserver).await;

        assert_eq!(results.len(), 10);
        for (result, expected) in results.iter().zip(&sources) {
            assert_eq!(result.source.id, expected.id);
            assert_eq!(result.articles[0].title, expected.url);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_batches_but_not_after_the_last() {
        let sources: Vec<FeedSource> = (0..10).map(|i| source(&format!("s{i}"))).collect();
        let transport = StaggeredTransport {
            delay_step: Duration::ZERO,
        };
        let started = tokio::time::Instant::now();

        run_all(&transport, &sources, &options(8), &NullObserver).await;

        // Two batches, one inter-batch pause.
        assert_eq!(started.elapsed(), Duration::from_millis(500));

        let started = tokio::time::Instant::now();
        run_all(&transport, &sources[..8], &options(8), &NullObserver).await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_member_does_not_block_siblings_but_holds_the_batch() {
        let mut sources: Vec<FeedSource> = (0..4).map(|i| source(&format!("s{i}"))).collect();
        sources.insert(2, source("bad"));

        let transport = StaggeredTransport {
            delay_step: Duration::ZERO,
        };
        let started = tokio::time::Instant::now();

        let results = run_all(&transport, &sources, &options(8), &NullObserver).await;

        // The failing member retries twice (2 s + 4 s) inside its own batch.
        assert_eq!(started.elapsed(), Duration::from_millis(6_000));
        assert_eq!(results.len(), 5);
        assert!(results[2].error.is_some());
        assert!(results.iter().enumerate().all(|(i, r)| i == 2 || r.is_success()));
    }

    #[tokio::test(start_paused = true)]
    async fn full_pipeline_aggregates_mixed_sources() {
        use crate::aggregate::aggregate;
        use chrono::{TimeZone, Utc};

        /// One healthy RSS source, one healthy Atom source, one source that
        /// never answers in time.
        struct MixedTransport;

        impl FetchBody for MixedTransport {
            async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
                if url.ends_with("rss") {
                    Ok(r#"<rss version="2.0"><channel>
                        <item><title>R1</title><link>https://example.com/r1</link></item>
                        <item><title>R2</title><link>https://example.com/r2</link></item>
                    </channel></rss>"#
                        .to_string())
                } else if url.ends_with("atom") {
                    Ok(r#"<feed><entry>
                        <title>A1</title>
                        <link rel="alternate" href="https://example.com/a1"/>
                    </entry></feed>"#
                        .to_string())
                } else {
                    Err(FetchError::Http(504))
                }
            }
        }

        let sources = vec![source("rss"), source("atom"), source("dead")];
        let results = run_all(
            &MixedTransport,
            &sources,
            &FetchOptions::default(),
            &NullObserver,
        )
        .await;

        let report = aggregate(
            results,
            Utc.with_ymd_and_hms(2026, 1, 6, 8, 0, 0).unwrap(),
        );

        assert_eq!(report.feed_count, 3);
        assert_eq!(report.success_count, 2);
        assert_eq!(report.article_count, 3);
        assert!(report.feeds[2].error.is_some());
        assert!(report.articles.iter().all(|article| article.feed_id != "dead"));
        assert_eq!(report.articles[2].link, "https://example.com/a1");
    }

    #[tokio::test]
    async fn empty_source_list_yields_empty_results() {
        let transport = StaggeredTransport {
            delay_step: Duration::ZERO,
        };
        let results = run_all(&transport, &[], &FetchOptions::default(), &NullObserver).await;
        assert!(results.is_empty());
    }
}
