//! # Tsinghua news scraper
//!
//! Reads the news index of `news.tsinghua.edu.cn` and individual article pages
//! into typed records, and writes the index to CSV.
//!
//! ## Features
//!
//! - Index scraping by direct request (raw markup) or, with the `browser`
//!   feature, through a headless browser (rendered DOM)
//! - Per-mode extraction of titles, links, summaries, dates and thumbnails
//! - Article parsing: body text, paper and reference links, editors, provider,
//!   captioned images
//! - CSV output with a shared write timestamp
//! - Visitor counts behind the `views` feature
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use thnews_scraper::{build_http_client, parse_article, scrape_index, FetchMode, SiteConfig};
//!
//! # async fn run() -> thnews_scraper::Result<()> {
//! let client = build_http_client()?;
//! let config = SiteConfig::default();
//! let columns = scrape_index(&client, &config, FetchMode::Requests, Path::new(".")).await?;
//! if let Some(url) = columns.urls.first() {
//!     let article = parse_article(&client, &config, url).await?;
//!     println!("{:?}", article.editors);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod scrapers;
pub mod utils;

pub use config::SiteConfig;
pub use error::{Result, ScrapeError};
pub use models::{ArticleImage, ArticleRecord, FetchMode, IndexColumns, IndexRecord};
pub use outputs::table::write_index_csv;
pub use scrapers::article::{extract_article, parse_article};
pub use scrapers::fetch::{build_http_client, load_index};
pub use scrapers::index::{IndexExtractor, RawMarkup, RenderedDom, scrape_index};
