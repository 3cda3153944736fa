//! Site configuration: where the news portal lives and how long to wait for it.

use crate::error::Result;
use std::time::Duration;
use url::Url;

/// Origin of the Tsinghua news portal.
pub const DEFAULT_ORIGIN: &str = "http://news.tsinghua.edu.cn";

/// Path of the news index page, relative to the origin.
pub const DEFAULT_INDEX_PATH: &str = "/publish/thunews/9648/index.html";

/// Timeout applied to each attempt at fetching the index page.
pub const DEFAULT_INDEX_TIMEOUT: Duration = Duration::from_secs(30);

/// Location of the portal plus the index fetch timeout.
///
/// The origin is stored without a trailing slash so relative paths taken from
/// the page (which start with `/`) can be appended as-is.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    origin: String,
    index_path: String,
    pub index_timeout: Duration,
}

impl SiteConfig {
    /// Builds a config for `origin`, validating that it is an absolute URL.
    pub fn new(origin: &str, index_path: &str, index_timeout: Duration) -> Result<Self> {
        Url::parse(origin)?;
        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            index_path: index_path.to_string(),
            index_timeout,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Full URL of the index page.
    pub fn index_url(&self) -> String {
        crate::utils::absolutize(&self.origin, &self.index_path)
    }

    /// Visitor-count endpoint for one article identifier.
    #[cfg(feature = "views")]
    pub fn view_count_url(&self, article_id: &str) -> String {
        format!(
            "{}/application/visitor/article_list_visitors_2.jsp?articleID={}",
            self.origin,
            urlencoding::encode(article_id)
        )
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            index_path: DEFAULT_INDEX_PATH.to_string(),
            index_timeout: DEFAULT_INDEX_TIMEOUT,
        }
    }
}
