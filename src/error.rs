//! Error type shared by the fetchers, extractors and writers.
//!
//! Network failures (`Timeout`, `Http`, `Browser`) are kept apart from page
//! structure failures (`MalformedIndex`, `MalformedArticle`) so a caller can
//! tell "the site is unreachable" from "this page no longer looks the way we
//! expect".

use thiserror::Error;

/// Main error type for scraping operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed index page: {0}")]
    MalformedIndex(String),

    #[error("Malformed article page: {0}")]
    MalformedArticle(String),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Browser fetching is unavailable; rebuild with the `browser` feature")]
    BrowserUnavailable,

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Wraps a reqwest failure, classifying client-side timeouts separately.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ScrapeError::Timeout {
                url: url.to_string(),
            }
        } else {
            ScrapeError::Http {
                url: url.to_string(),
                source,
            }
        }
    }

    /// True for errors caused by the page structure rather than the network.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ScrapeError::MalformedIndex(_) | ScrapeError::MalformedArticle(_)
        )
    }
}

/// Result type alias for scraping operations
pub type Result<T> = std::result::Result<T, ScrapeError>;
