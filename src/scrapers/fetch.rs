//! Page retrieval.
//!
//! The index page can be fetched two ways (see [`FetchMode`]):
//!
//! | Mode | Transport | Timeout | Retry |
//! |------|-----------|---------|-------|
//! | `Requests` | HTTP GET | per attempt, from [`SiteConfig`] | once, on timeout only |
//! | `Browser` | headless browser | none | none |
//!
//! Article pages are always fetched with a plain GET and no timeout.

use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::SiteConfig;
use crate::error::{Result, ScrapeError};
use crate::models::FetchMode;

/// Build the HTTP client used for every request.
///
/// No client-wide timeout is set; the index fetch applies its own per request.
pub fn build_http_client() -> Result<Client> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| ScrapeError::from_reqwest("<client>", e))
}

/// Fetch the index page and parse it.
#[instrument(level = "info", skip(client, config), fields(url = %config.index_url()))]
pub async fn load_index(client: &Client, config: &SiteConfig, mode: FetchMode) -> Result<Html> {
    let source = match mode {
        FetchMode::Requests => fetch_index_source(client, config).await?,
        FetchMode::Browser => fetch_rendered_source(&config.index_url()).await?,
    };
    info!(bytes = source.len(), %mode, "Loaded index page");
    Ok(Html::parse_document(&source))
}

/// GET the raw index markup, retrying once if the first attempt times out.
///
/// A second timeout surfaces as [`ScrapeError::Timeout`]. Connection and other
/// failures are returned immediately.
#[instrument(level = "debug", skip_all)]
pub async fn fetch_index_source(client: &Client, config: &SiteConfig) -> Result<String> {
    let url = config.index_url();
    match get_body(client, &url, Some(config.index_timeout)).await {
        Err(ScrapeError::Timeout { .. }) => {
            warn!(%url, timeout = ?config.index_timeout, "Timeout error; trying once more");
            get_body(client, &url, Some(config.index_timeout)).await
        }
        other => other,
    }
}

/// GET an article page. No timeout is applied.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_article_source(client: &Client, url: &str) -> Result<String> {
    get_body(client, url, None).await
}

async fn get_body(client: &Client, url: &str, timeout: Option<Duration>) -> Result<String> {
    let mut request = client.get(url);
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }
    let response = request
        .send()
        .await
        .map_err(|e| ScrapeError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        warn!(%url, %status, "Non-success status; parsing body anyway");
    }

    // Decoded with the charset from Content-Type (UTF-8 when none is given);
    // older portal pages are served as GBK.
    let body = response
        .text()
        .await
        .map_err(|e| ScrapeError::from_reqwest(url, e))?;
    debug!(%url, bytes = body.len(), "Fetched page");
    Ok(body)
}

#[cfg(feature = "browser")]
async fn fetch_rendered_source(url: &str) -> Result<String> {
    super::browser::rendered_source(url).await
}

#[cfg(not(feature = "browser"))]
async fn fetch_rendered_source(url: &str) -> Result<String> {
    warn!(%url, "Browser mode requested but the `browser` feature is disabled");
    Err(ScrapeError::BrowserUnavailable)
}
