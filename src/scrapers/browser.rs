//! Headless browser fetching (feature `browser`).
//!
//! Launches a Chromium instance through the DevTools protocol, navigates to the
//! page, reads the rendered source and shuts the browser down again. One
//! browser process lives for exactly one call.

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ScrapeError};

fn browser_error(e: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Browser(e.to_string())
}

/// Page source of `url` after client-side scripts have run.
#[instrument(level = "info")]
pub async fn rendered_source(url: &str) -> Result<String> {
    let config = BrowserConfig::builder().build().map_err(browser_error)?;
    let (mut browser, mut handler) = Browser::launch(config).await.map_err(browser_error)?;

    // The CDP connection only makes progress while the handler is polled.
    let handle = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });
    info!("Browser launched");

    let source = async {
        let page = browser.new_page(url).await.map_err(browser_error)?;
        page.wait_for_navigation().await.map_err(browser_error)?;
        page.content().await.map_err(browser_error)
    }
    .await;

    if let Err(e) = browser.close().await {
        warn!(error = %e, "Failed to close browser cleanly");
    }
    if let Err(e) = browser.wait().await {
        warn!(error = %e, "Failed to reap browser process");
    }
    handle.abort();
    debug!("Browser shut down");

    source
}
