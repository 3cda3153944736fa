//! Article view counts (feature `views`).
//!
//! The portal used to expose a visitor counter per article. It no longer shows
//! it, so this is kept out of the index scrape and only runs when asked for
//! explicitly. Counting tolerates per-article failures: an article whose count
//! cannot be read is reported as [`ViewCount::Unknown`].

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::SiteConfig;
use crate::error::Result;
use crate::utils::{full_text, selector};

/// Pause after each visitor-count request.
pub const REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Article identifiers are timestamp-based: 17+ digits, a whole path segment.
static ARTICLE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d{17,})(?:/|$)").expect("valid regex"));

/// Number of views of one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ViewCount {
    /// Count as returned by the portal.
    Known(String),
    Unknown,
}

impl fmt::Display for ViewCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewCount::Known(count) => f.write_str(count),
            ViewCount::Unknown => f.write_str("unknown"),
        }
    }
}

/// Article identifier embedded in a thumbnail or article path.
///
/// ```ignore
/// assert_eq!(
///     article_id("/publish/thunews/9648/2016/20161125111440926399642/20161125111440926399642_.html"),
///     Some("20161125111440926399642")
/// );
/// ```
pub fn article_id(path: &str) -> Option<&str> {
    ARTICLE_ID
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Query the visitor-count endpoint for each thumbnail path, one request per
/// second.
#[instrument(level = "info", skip_all, fields(count = pic_paths.len()))]
pub async fn fetch_view_counts(
    client: &Client,
    config: &SiteConfig,
    pic_paths: &[String],
) -> Vec<ViewCount> {
    let mut views = Vec::with_capacity(pic_paths.len());
    for path in pic_paths {
        let Some(id) = article_id(path) else {
            warn!(%path, "No article id in thumbnail path");
            views.push(ViewCount::Unknown);
            continue;
        };

        let url = config.view_count_url(id);
        let count = match fetch_count(client, &url, config.index_timeout).await {
            Ok(text) => {
                debug!(%url, views = %text.trim(), "Fetched view count");
                ViewCount::Known(text.trim().to_string())
            }
            Err(e) => {
                warn!(%url, error = %e, "Failed to find views");
                ViewCount::Unknown
            }
        };
        views.push(count);
        sleep(REQUEST_DELAY).await;
    }
    info!(
        known = views.iter().filter(|v| **v != ViewCount::Unknown).count(),
        "Collected view counts"
    );
    views
}

async fn fetch_count(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> std::result::Result<String, reqwest::Error> {
    client.get(url).timeout(timeout).send().await?.text().await
}

/// Read view counters shown in a rendered index page, one per article entry.
pub fn rendered_view_counts(document: &Html) -> Result<Vec<ViewCount>> {
    let entry_sel = selector(r#"li[class="clearfix"]"#)?;
    let counter_sel = selector(r#"font[id*="itemlist_total_"]"#)?;
    Ok(document
        .select(&entry_sel)
        .map(|entry| {
            entry
                .select(&counter_sel)
                .next()
                .map(full_text)
                .and_then(|text| text.trim().parse::<u64>().ok())
                .map(|n| ViewCount::Known(n.to_string()))
                .unwrap_or(ViewCount::Unknown)
        })
        .collect())
}
