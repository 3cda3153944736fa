//! Index page extraction.
//!
//! The index page lists every article with a title link, a summary, a date and
//! a thumbnail. Titles, links and thumbnails are plain markup in both fetch
//! modes; summaries and dates are not:
//!
//! - In the raw markup (direct request) they are arguments of inline script
//!   calls such as `cutSummary("...",180);` and have to be cut out with a regex.
//! - In the rendered DOM (browser) the scripts have already run, the summary is
//!   a text node and the date is split over a `ym` and a `dd` element.
//!
//! [`IndexExtractor`] captures the shared part; [`RawMarkup`] and
//! [`RenderedDom`] supply the two mode-specific columns.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::Html;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::config::SiteConfig;
use crate::error::{Result, ScrapeError};
use crate::models::{FetchMode, IndexColumns};
use crate::outputs::table::write_index_csv;
use crate::scrapers::fetch::load_index;
use crate::utils::{absolutize, direct_text, full_text, selector, truncate_for_log};

/// Title links: anchors whose class is exactly `jiequ`.
const TITLE_LINK: &str = r#"a[class="jiequ"]"#;
/// Summary paragraphs.
const SUMMARY: &str = r#"div[class="contentwraper"] > p"#;
/// Day part of the date (or, in raw markup, the whole date script).
const DAY: &str = r#"font[class="dd"]"#;
/// Year and month part of the date, rendered DOM only.
const YEAR_MONTH: &str = r#"font[class="ym"]"#;
/// Article thumbnails.
const THUMBNAIL: &str = r#"li[class="clearfix"] img[src*="/publish/thunews"]"#;

/// Everything between the first and the last double quote.
static QUOTED_GREEDY: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.*)""#).expect("valid regex"));
/// Everything between the first pair of double quotes.
static QUOTED_LAZY: Lazy<Regex> = Lazy::new(|| Regex::new(r#""(.*?)""#).expect("valid regex"));

/// Extract the text argument of a `cutSummary("<text>", <n>);` call.
pub fn capture_summary(script: &str) -> Option<&str> {
    QUOTED_GREEDY
        .captures(script)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Extract the quoted date string from an inline date script.
pub fn capture_date(script: &str) -> Option<&str> {
    QUOTED_LAZY
        .captures(script)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Reads the index columns out of a parsed index page.
///
/// Implementors only decide how summaries and dates are found; titles, links
/// and thumbnails are read the same way regardless of fetch mode.
pub trait IndexExtractor {
    /// Summary column, one entry per article.
    fn summaries(&self, document: &Html) -> Result<Vec<String>>;

    /// Date column, one entry per article.
    fn dates(&self, document: &Html) -> Result<Vec<String>>;

    /// Extract all five columns, absolutizing links against `origin`.
    fn extract(&self, document: &Html, origin: &str) -> Result<IndexColumns> {
        let (titles, urls) = titles_and_urls(document, origin)?;
        let summaries = self.summaries(document)?;
        let dates = self.dates(document)?;
        let pics = thumbnails(document, origin)?;
        IndexColumns::new(titles, urls, summaries, dates, pics)
    }
}

/// Extraction over raw markup from a direct request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawMarkup;

/// Extraction over the DOM rendered by a browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderedDom;

impl FetchMode {
    /// The extractor matching the markup this mode produces.
    pub fn extractor(self) -> &'static dyn IndexExtractor {
        match self {
            FetchMode::Requests => &RawMarkup,
            FetchMode::Browser => &RenderedDom,
        }
    }
}

impl IndexExtractor for RawMarkup {
    fn summaries(&self, document: &Html) -> Result<Vec<String>> {
        quoted_texts(document, SUMMARY, "summary", capture_summary)
    }

    fn dates(&self, document: &Html) -> Result<Vec<String>> {
        quoted_texts(document, DAY, "date", capture_date)
    }
}

impl IndexExtractor for RenderedDom {
    fn summaries(&self, document: &Html) -> Result<Vec<String>> {
        let sel = selector(SUMMARY)?;
        // One entry per paragraph, empty ones included, so a story without a
        // summary keeps its row aligned with its title.
        Ok(document.select(&sel).map(direct_text).collect())
    }

    fn dates(&self, document: &Html) -> Result<Vec<String>> {
        let day_sel = selector(DAY)?;
        let ym_sel = selector(YEAR_MONTH)?;
        let days: Vec<String> = document.select(&day_sel).map(direct_text).collect();
        let year_months: Vec<String> = document.select(&ym_sel).map(full_text).collect();

        if days.len() != year_months.len() {
            return Err(ScrapeError::MalformedIndex(format!(
                "{} year-month nodes but {} day nodes",
                year_months.len(),
                days.len()
            )));
        }

        Ok(year_months
            .iter()
            .zip(&days)
            .map(|(ym, day)| format!("{}.{}", ym.trim(), day.trim()))
            .collect())
    }
}

fn titles_and_urls(document: &Html, origin: &str) -> Result<(Vec<String>, Vec<String>)> {
    let sel = selector(TITLE_LINK)?;
    let mut titles = Vec::new();
    let mut urls = Vec::new();
    for anchor in document.select(&sel) {
        let title = full_text(anchor);
        let href = anchor.value().attr("href").ok_or_else(|| {
            ScrapeError::MalformedIndex(format!("title link without href: {title:?}"))
        })?;
        titles.push(title);
        urls.push(absolutize(origin, href));
    }
    Ok((titles, urls))
}

fn thumbnails(document: &Html, origin: &str) -> Result<Vec<String>> {
    let sel = selector(THUMBNAIL)?;
    Ok(document
        .select(&sel)
        .filter_map(|img| img.value().attr("src"))
        .map(|src| absolutize(origin, src))
        .collect())
}

/// Run `capture` over every non-blank text node under the elements matching
/// `css`. A node without a quoted string fails the whole extraction.
fn quoted_texts(
    document: &Html,
    css: &str,
    what: &str,
    capture: fn(&str) -> Option<&str>,
) -> Result<Vec<String>> {
    let sel = selector(css)?;
    let mut out = Vec::new();
    for el in document.select(&sel) {
        for text in el.text().filter(|t| !t.trim().is_empty()) {
            let value = capture(text).ok_or_else(|| {
                ScrapeError::MalformedIndex(format!(
                    "no quoted {what} in {:?}",
                    truncate_for_log(text.trim(), 80)
                ))
            })?;
            out.push(value.to_string());
        }
    }
    Ok(out)
}

/// Fetch the index page, extract its columns and write them to CSV.
///
/// The CSV lands in `output_dir` under the mode's file name (see
/// [`FetchMode::csv_file_name`]), replacing any previous file.
#[instrument(
    level = "info",
    skip(client, config, output_dir),
    fields(output_dir = %output_dir.display())
)]
pub async fn scrape_index(
    client: &Client,
    config: &SiteConfig,
    mode: FetchMode,
    output_dir: &Path,
) -> Result<IndexColumns> {
    let document = load_index(client, config, mode).await?;
    let columns = mode.extractor().extract(&document, config.origin())?;
    info!(count = columns.len(), %mode, "Extracted index entries");
    if let Some(first) = columns.records().next() {
        debug!(
            title = %first.title,
            date = %first.date,
            summary = %truncate_for_log(&first.summary, 40),
            "First index entry"
        );
    }

    write_index_csv(output_dir, mode, &columns)?;
    Ok(columns)
}
