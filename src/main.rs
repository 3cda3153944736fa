//! # thnews
//!
//! Command-line front end for the Tsinghua news scraper.
//!
//! ## Usage
//!
//! ```sh
//! thnews index --mode requests -o ./out
//! thnews article <URL> --pretty
//! ```
//!
//! Logs go to stderr (filter with `RUST_LOG`); `article` prints its JSON on
//! stdout.

use clap::Parser;
use std::error::Error;
use std::time::Duration;
use thnews_scraper::utils::{ensure_writable_dir, truncate_for_log};
use thnews_scraper::{SiteConfig, build_http_client, parse_article, scrape_index};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = SiteConfig::new(
        &args.site.origin,
        &args.site.index_path,
        Duration::from_secs(args.site.timeout_secs),
    )?;
    let client = build_http_client()?;

    match args.command {
        Command::Index { mode, output_dir } => {
            if let Err(e) = ensure_writable_dir(&output_dir).await {
                error!(
                    path = %output_dir.display(),
                    error = %e,
                    "Output directory is not writable (fix perms or choose a different path)"
                );
                return Err(e.into());
            }

            let columns = match scrape_index(&client, &config, mode, &output_dir).await {
                Ok(columns) => columns,
                Err(e) => {
                    error!(error = %e, malformed = e.is_malformed(), %mode, "Index scrape failed");
                    return Err(e.into());
                }
            };
            for record in columns.records() {
                info!(
                    date = %record.date,
                    title = %truncate_for_log(&record.title, 40),
                    url = %record.url,
                    "Index entry"
                );
            }
        }
        Command::Article { url, pretty } => {
            let article = match parse_article(&client, &config, &url).await {
                Ok(article) => article,
                Err(e) => {
                    error!(%url, error = %e, malformed = e.is_malformed(), "Article parse failed");
                    return Err(e.into());
                }
            };
            let json = if pretty {
                serde_json::to_string_pretty(&article)?
            } else {
                serde_json::to_string(&article)?
            };
            println!("{json}");
        }
        #[cfg(feature = "views")]
        Command::Views { mode } => {
            use thnews_scraper::FetchMode;
            use thnews_scraper::load_index;
            use thnews_scraper::scrapers::views::{fetch_view_counts, rendered_view_counts};

            let document = load_index(&client, &config, mode).await?;
            let columns = mode.extractor().extract(&document, config.origin())?;
            let views = match mode {
                FetchMode::Browser => rendered_view_counts(&document)?,
                FetchMode::Requests => fetch_view_counts(&client, &config, &columns.pics).await,
            };
            for (url, count) in columns.urls.iter().zip(&views) {
                println!("{count}\t{url}");
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}
