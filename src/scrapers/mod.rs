//! Fetching and extraction for the Tsinghua news portal.
//!
//! The work splits into a fetch phase and an extraction phase:
//!
//! 1. **Fetching** ([`fetch`], [`browser`]): load the index page by direct
//!    request or through a headless browser, and load article pages by GET.
//! 2. **Extraction** ([`index`], [`article`]): pure functions over the parsed
//!    tree that return typed records.
//!
//! # Modules
//!
//! | Module | Purpose | Feature |
//! |--------|---------|---------|
//! | [`fetch`] | HTTP client, index fetch with one timeout retry | |
//! | [`browser`] | rendered page source via Chromium | `browser` |
//! | [`index`] | index columns, one extractor per fetch mode | |
//! | [`article`] | article body, links, editors, images | |
//! | [`views`] | visitor counts (no longer shown by the site) | `views` |

pub mod article;
#[cfg(feature = "browser")]
pub mod browser;
pub mod fetch;
pub mod index;
#[cfg(feature = "views")]
pub mod views;
