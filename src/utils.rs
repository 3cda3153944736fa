//! Helpers shared by the extractors and writers.
//!
//! This module provides:
//! - URL absolutization against the site origin
//! - Small DOM helpers on top of `scraper` (selector parsing, direct text,
//!   style inspection, following siblings)
//! - Timestamp formatting for the CSV `writetime` column
//! - String truncation for log previews
//! - Output directory validation

use chrono::{DateTime, Local};
use scraper::{ElementRef, Selector};
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::{Result, ScrapeError};

/// Format of the `writetime` column, e.g. `2016-11-29 14:05:09`.
pub const WRITETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prefix a site-relative path with the origin.
///
/// Paths scraped from the portal start with `/`, in which case this is a plain
/// concatenation. A path without a leading slash gets one inserted so the
/// result never runs host and path together.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     absolutize("http://news.tsinghua.edu.cn", "/publish/a.html"),
///     "http://news.tsinghua.edu.cn/publish/a.html"
/// );
/// ```
pub fn absolutize(origin: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}

/// Parse a CSS selector, turning a syntax error into [`ScrapeError::Selector`].
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css}: {e:?}")))
}

/// Text nodes that are direct children of `el`, in document order.
///
/// This is the equivalent of an XPath `text()` step: text inside nested
/// elements is not included.
pub fn direct_text_nodes<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    el.children().filter_map(|child| child.value().as_text().map(|t| &**t))
}

/// Concatenation of the direct text nodes of `el`.
pub fn direct_text(el: ElementRef<'_>) -> String {
    direct_text_nodes(el).collect()
}

/// Concatenation of every descendant text node of `el`.
pub fn full_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Whether `el` carries a `text-align` property in its inline style.
///
/// The portal's markup is inconsistent about case (`TEXT-ALIGN` shows up on
/// older articles), so the property name is matched case-insensitively.
pub fn has_text_align(el: ElementRef<'_>) -> bool {
    el.value()
        .attr("style")
        .map(|style| style.to_ascii_lowercase().contains("text-align"))
        .unwrap_or(false)
}

/// Sibling elements after `el` in document order.
pub fn following_siblings<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.next_siblings().filter_map(ElementRef::wrap)
}

/// Whether any element below `el` has the given tag name.
pub fn has_descendant(el: ElementRef<'_>, tag: &str) -> bool {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|d| d.value().name() == tag)
}

/// Render a timestamp for the `writetime` column.
pub fn writetime(now: &DateTime<Local>) -> String {
    now.format(WRITETIME_FORMAT).to_string()
}

/// Truncate a string for logging purposes.
///
/// Counts characters rather than bytes; summaries are mostly CJK text and a
/// byte slice would split a code point.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}…(+{} chars)", head, total - max)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a scratch file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    let check_path = path.join("..__write_check__");
    stdfs::File::create(&check_path)?;
    if let Err(e) = stdfs::remove_file(&check_path) {
        warn!(path = %check_path.display(), error = %e, "Failed to remove write check file");
    }
    info!("Output directory is writable");
    Ok(())
}
