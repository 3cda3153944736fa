//! Command-line interface definitions for the `thnews` binary.
//!
//! Site settings can be given as flags or environment variables; the defaults
//! point at the live portal.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use thnews_scraper::FetchMode;
use thnews_scraper::config::{DEFAULT_INDEX_PATH, DEFAULT_ORIGIN};

/// Command-line arguments for the `thnews` binary.
///
/// # Examples
///
/// ```sh
/// # Scrape the index by direct request into ./thNewsRequests.csv
/// thnews index
///
/// # Scrape through a headless browser (requires the `browser` feature)
/// thnews index --mode browser -o ./out
///
/// # Parse one article and print it as JSON
/// thnews article http://news.tsinghua.edu.cn/publish/thunews/9648/2016/20161125111440926399642/20161125111440926399642_.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub site: SiteArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the portal lives.
#[derive(Args, Debug)]
pub struct SiteArgs {
    /// Origin of the news portal
    #[arg(long, global = true, env = "THNEWS_ORIGIN", default_value = DEFAULT_ORIGIN)]
    pub origin: String,

    /// Path of the index page, relative to the origin
    #[arg(long, global = true, env = "THNEWS_INDEX_PATH", default_value = DEFAULT_INDEX_PATH)]
    pub index_path: String,

    /// Timeout in seconds for each attempt at fetching the index page
    #[arg(long, global = true, env = "THNEWS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the index page and write it to CSV
    Index {
        /// How to fetch the index page
        #[arg(short, long, value_enum, default_value_t = FetchMode::Requests)]
        mode: FetchMode,

        /// Directory for the CSV file
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Parse one article page and print it as JSON
    Article {
        /// Absolute URL of the article
        url: String,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Fetch visitor counts for the articles on the index page
    #[cfg(feature = "views")]
    Views {
        /// How to fetch the index page
        #[arg(short, long, value_enum, default_value_t = FetchMode::Requests)]
        mode: FetchMode,
    },
}
