//! JSON report writing.
//!
//! Serializes the [`AggregateReport`] with pretty formatting (the file is
//! routinely inspected by hand and diffed) and writes it to the configured
//! output path, creating parent directories as needed.

use std::error::Error;
use std::path::Path;

use tokio::fs;
use tracing::{info, instrument};

use crate::models::AggregateReport;

/// Write the report to `path`.
///
/// # Errors
///
/// Fails when the parent directory cannot be created or the file cannot be
/// written.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub async fn write_report(
    report: &AggregateReport,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn Error>> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(path, json).await?;
    info!(
        feeds = report.feed_count,
        articles = report.article_count,
        "Wrote aggregate report"
    );
    Ok(())
}
