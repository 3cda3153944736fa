//! Article page extraction.
//!
//! Everything is read from inside `<article class="article">`. The article
//! markup is hand-edited and inconsistent, so several fields are located by
//! their Chinese labels rather than by class names:
//!
//! | Field | Located by |
//! |-------|------------|
//! | body text | paragraphs with no `span` and no `text-align` style |
//! | paper link | `本文链接：` / `论文链接：` labels (three layouts) |
//! | reference links | paragraphs after a `参考文献链接：` / `相关论文链接：` label |
//! | editors, provider | the aligned paragraph containing `编辑` |
//! | images | every `img`, captioned by the paragraph that follows it |
//!
//! Two structural assumptions are enforced: there is exactly one editor line,
//! and every image has a caption slot. A page breaking either is reported as
//! [`ScrapeError::MalformedArticle`].

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

use crate::config::SiteConfig;
use crate::error::{Result, ScrapeError};
use crate::models::{ArticleImage, ArticleRecord};
use crate::scrapers::fetch::fetch_article_source;
use crate::utils::{
    absolutize, direct_text, direct_text_nodes, following_siblings, full_text, has_descendant,
    has_text_align, selector,
};

const ARTICLE_PARAGRAPHS: &str = r#"article[class="article"] p"#;
const ARTICLE_IMAGES: &str = r#"article[class="article"] img[src]"#;

const ARTICLE_LINK_LABEL: &str = "本文链接：";
const PAPER_LINK_LABEL: &str = "论文链接：";
const REFERENCE_LABELS: [&str; 2] = ["参考文献链接：", "相关论文链接："];
const EDITOR_MARK: &str = "编辑";

static EDITORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"编辑：(.*)").expect("valid regex"));
static PROVIDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"供稿：(.*?)编辑：").expect("valid regex"));

/// Fetch an article page and extract its fields.
#[instrument(level = "info", skip(client, config))]
pub async fn parse_article(
    client: &Client,
    config: &SiteConfig,
    url: &str,
) -> Result<ArticleRecord> {
    let body = fetch_article_source(client, url).await?;
    let document = Html::parse_document(&body);
    let article = extract_article(&document, config.origin())?;
    info!(
        chars = article.article_text.chars().count(),
        editors = article.editors.len(),
        images = article.images.len(),
        has_paper_link = article.paper_link.is_some(),
        "Parsed article"
    );
    Ok(article)
}

/// Extract an [`ArticleRecord`] from a parsed article page.
///
/// Image URLs are absolutized against `origin`; paper and reference links are
/// taken verbatim since they point off-site.
pub fn extract_article(document: &Html, origin: &str) -> Result<ArticleRecord> {
    let sel = selector(ARTICLE_PARAGRAPHS)?;
    let paragraphs: Vec<ElementRef<'_>> = document.select(&sel).collect();
    debug!(paragraphs = paragraphs.len(), "Selected article paragraphs");

    let (editors, provider) = editor_line(&paragraphs)?;

    Ok(ArticleRecord {
        article_text: body_text(&paragraphs),
        paper_link: paper_link(&paragraphs),
        ref_links: ref_links(&paragraphs),
        editors,
        provider,
        images: images(document, &paragraphs, origin)?,
    })
}

fn is(el: &ElementRef<'_>, tag: &str) -> bool {
    el.value().name() == tag
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children().filter_map(ElementRef::wrap)
}

fn has_own_text(el: ElementRef<'_>, label: &str) -> bool {
    direct_text_nodes(el).any(|t| t.trim() == label)
}

/// Whether `p` contains a span whose own text satisfies `pred`.
fn has_span_where(p: ElementRef<'_>, pred: impl Fn(&str) -> bool) -> bool {
    p.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|d| is(d, "span"))
        .any(|span| direct_text_nodes(span).any(&pred))
}

fn first_child_href(el: ElementRef<'_>) -> Option<String> {
    child_elements(el)
        .filter(|c| is(c, "a"))
        .find_map(|a| a.value().attr("href"))
        .map(str::to_string)
}

fn body_text(paragraphs: &[ElementRef<'_>]) -> String {
    paragraphs
        .iter()
        .filter(|p| !has_descendant(**p, "span") && !has_text_align(**p))
        .flat_map(|p| p.text())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The original-paper link, trying each known layout in turn.
fn paper_link(paragraphs: &[ElementRef<'_>]) -> Option<String> {
    // <p><span>本文链接：</span><a href=...></p>
    let labeled_span = || {
        paragraphs
            .iter()
            .flat_map(|p| child_elements(*p))
            .filter(|c| is(c, "span") && has_own_text(*c, ARTICLE_LINK_LABEL))
            .find_map(|span| {
                following_siblings(span)
                    .find(|s| is(s, "a"))
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string)
            })
    };

    // <p><span>论文链接：</span></p><p><a href=...></p>
    let labeled_block = || {
        paragraphs
            .iter()
            .filter(|p| has_span_where(**p, |t| t.trim() == PAPER_LINK_LABEL))
            .find_map(|p| {
                following_siblings(*p)
                    .find(|s| is(s, "p"))
                    .and_then(first_child_href)
            })
    };

    // <p>论文链接：<a href=...></p>
    let inline_label = || {
        paragraphs
            .iter()
            .filter(|p| has_own_text(**p, PAPER_LINK_LABEL))
            .find_map(|p| first_child_href(*p))
    };

    labeled_span()
        .or_else(labeled_block)
        .or_else(inline_label)
}

/// Links in the paragraphs following a references label, in document order.
fn ref_links(paragraphs: &[ElementRef<'_>]) -> Option<Vec<String>> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let labels = paragraphs.iter().filter(|p| {
        has_span_where(**p, |t| REFERENCE_LABELS.iter().any(|label| t.contains(*label)))
    });
    for label in labels {
        for sibling in following_siblings(*label).filter(|s| is(s, "p")) {
            if !seen.insert(sibling.id()) {
                continue;
            }
            links.extend(
                child_elements(sibling)
                    .filter(|c| is(c, "a"))
                    .filter_map(|a| a.value().attr("href"))
                    .map(str::to_string),
            );
        }
    }

    (!links.is_empty()).then_some(links)
}

/// Editors and provider from the single aligned `编辑` paragraph.
fn editor_line(paragraphs: &[ElementRef<'_>]) -> Result<(Vec<String>, Option<String>)> {
    let lines: Vec<&ElementRef<'_>> = paragraphs
        .iter()
        .filter(|p| {
            has_text_align(**p) && direct_text_nodes(**p).any(|t| t.contains(EDITOR_MARK))
        })
        .collect();

    let line = match lines.as_slice() {
        [line] => direct_text(**line),
        other => {
            return Err(ScrapeError::MalformedArticle(format!(
                "expected exactly one editor line, found {}",
                other.len()
            )));
        }
    };

    Ok((parse_editors(&line)?, parse_provider(&line)))
}

/// Names after `编辑：`, split on whitespace.
pub fn parse_editors(line: &str) -> Result<Vec<String>> {
    let names = EDITORS
        .captures(line)
        .and_then(|c| c.get(1))
        .ok_or_else(|| ScrapeError::MalformedArticle(format!("no editors in {line:?}")))?;
    Ok(names.as_str().split_whitespace().map(str::to_string).collect())
}

/// Text strictly between `供稿：` and `编辑：`, if the line credits a provider.
pub fn parse_provider(line: &str) -> Option<String> {
    PROVIDER
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn images(
    document: &Html,
    paragraphs: &[ElementRef<'_>],
    origin: &str,
) -> Result<Vec<ArticleImage>> {
    let sel = selector(ARTICLE_IMAGES)?;
    let urls: Vec<String> = document
        .select(&sel)
        .filter_map(|img| img.value().attr("src"))
        .map(|src| absolutize(origin, src))
        .collect();

    let captions: Vec<String> = paragraphs
        .iter()
        .filter(|p| has_descendant(**p, "img"))
        .map(|p| {
            following_siblings(*p)
                .find(|s| is(s, "p"))
                .map(full_text)
                .unwrap_or_default()
        })
        .collect();

    if urls.len() != captions.len() {
        return Err(ScrapeError::MalformedArticle(format!(
            "{} images but {} captions",
            urls.len(),
            captions.len()
        )));
    }

    Ok(urls
        .into_iter()
        .zip(captions)
        .map(|(url, caption)| ArticleImage { url, caption })
        .collect())
}
