//! Data models for scraped index entries and article pages.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`FetchMode`]: how the index page was retrieved, which decides how it is read
//! - [`IndexColumns`]: the five parallel columns extracted from the index page
//! - [`IndexRecord`]: one row of those columns
//! - [`ArticleRecord`] / [`ArticleImage`]: the fields extracted from an article page

use clap::ValueEnum;
use itertools::izip;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ScrapeError};

/// How the index page is retrieved.
///
/// The two strategies see different markup: a direct request gets the raw HTML
/// with the summaries and dates still wrapped in inline script calls, while a
/// browser session sees the DOM after those scripts ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Plain HTTP GET of the raw markup.
    Requests,
    /// Headless browser session, rendered DOM.
    Browser,
}

impl FetchMode {
    /// Name of the CSV file written for this mode.
    pub fn csv_file_name(self) -> &'static str {
        match self {
            FetchMode::Requests => "thNewsRequests.csv",
            FetchMode::Browser => "thNewsSelenium.csv",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Requests => f.write_str("requests"),
            FetchMode::Browser => f.write_str("browser"),
        }
    }
}

/// One article as listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub title: String,
    /// Absolute article URL.
    pub url: String,
    pub summary: String,
    /// Publication date as printed on the page, e.g. `2016.11.25`.
    pub date: String,
    /// Absolute thumbnail URL.
    pub pic: String,
}

/// The five columns extracted from the index page, in document order.
///
/// Construction through [`IndexColumns::new`] guarantees that all columns have
/// the same length, so row `i` of every column describes the same article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexColumns {
    pub titles: Vec<String>,
    pub urls: Vec<String>,
    pub summaries: Vec<String>,
    pub dates: Vec<String>,
    pub pics: Vec<String>,
}

impl IndexColumns {
    /// Assemble the columns, failing if their lengths disagree.
    pub fn new(
        titles: Vec<String>,
        urls: Vec<String>,
        summaries: Vec<String>,
        dates: Vec<String>,
        pics: Vec<String>,
    ) -> Result<Self> {
        let n = titles.len();
        if [urls.len(), summaries.len(), dates.len(), pics.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err(ScrapeError::MalformedIndex(format!(
                "column lengths differ: titles={}, urls={}, summaries={}, dates={}, pics={}",
                n,
                urls.len(),
                summaries.len(),
                dates.len(),
                pics.len()
            )));
        }
        Ok(Self {
            titles,
            urls,
            summaries,
            dates,
            pics,
        })
    }

    /// Number of articles.
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Iterate the columns row by row.
    pub fn records(&self) -> impl Iterator<Item = IndexRecord> + '_ {
        izip!(
            &self.titles,
            &self.urls,
            &self.summaries,
            &self.dates,
            &self.pics
        )
        .map(|(title, url, summary, date, pic)| IndexRecord {
            title: title.clone(),
            url: url.clone(),
            summary: summary.clone(),
            date: date.clone(),
            pic: pic.clone(),
        })
    }
}

impl FromIterator<IndexRecord> for IndexColumns {
    fn from_iter<I: IntoIterator<Item = IndexRecord>>(iter: I) -> Self {
        let mut columns = IndexColumns::default();
        for record in iter {
            columns.titles.push(record.title);
            columns.urls.push(record.url);
            columns.summaries.push(record.summary);
            columns.dates.push(record.date);
            columns.pics.push(record.pic);
        }
        columns
    }
}

/// An image in an article body together with the caption paragraph below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleImage {
    /// Absolute image URL.
    pub url: String,
    /// Caption text; empty when the caption paragraph has no text.
    pub caption: String,
}

/// Everything extracted from one article page.
///
/// Serialized with camelCase keys (`articleText`, `paperLink`, `refLinks`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Body paragraphs joined by single spaces.
    pub article_text: String,
    /// Link to the original paper when the article reports on one.
    pub paper_link: Option<String>,
    /// Reference links listed under a references heading.
    pub ref_links: Option<Vec<String>>,
    pub editors: Vec<String>,
    /// The unit that supplied the story, when credited.
    pub provider: Option<String>,
    pub images: Vec<ArticleImage>,
}
