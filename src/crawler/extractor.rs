//! HTML content and link extraction
//!
//! This module turns a raw HTML body into:
//! - A bounded title
//! - Normalized plain text from the page's main content area
//! - Same-domain absolute links in first-seen order
//!
//! Extraction never fails outward. Bodies that cannot be read as HTML yield a
//! degraded extraction so the crawl loop can move on.

use crate::config::ExtractorConfig;
use crate::url::{is_document, is_social, normalize_parsed, DomainScope};
use crate::ExtractError;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Title used when a page has no usable `<title>`
pub const NO_TITLE: &str = "No Title";

/// Title used for degraded extractions
pub const PARSE_ERROR_TITLE: &str = "Error parsing HTML";

/// Content containers tried in order; the first one with text wins
const CONTENT_AREAS: &[&str] = &[
    "main",
    "article",
    r#"[class*="content"], [id*="content"], [class*="main"], [id*="main"], [class*="body"], [id*="body"]"#,
];

/// Elements whose text never counts as content
const NEVER_TEXT: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Page chrome dropped when falling back to the whole body
const CHROME: &[&str] = &["nav", "header", "footer"];

/// Result of extracting one page
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub links: Vec<Url>,
    pub word_count: usize,
    /// True when the body could not be parsed and defaults were returned
    pub degraded: bool,
}

impl Extraction {
    /// Placeholder for a body that could not be parsed
    pub fn degraded() -> Self {
        Self {
            title: PARSE_ERROR_TITLE.to_string(),
            description: None,
            content: String::new(),
            links: Vec::new(),
            word_count: 0,
            degraded: true,
        }
    }

    /// Content length in characters
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

/// Extracts titles, text and links from HTML bodies
#[derive(Debug, Clone)]
pub struct Extractor {
    scope: DomainScope,
    same_domain_only: bool,
    title_max_chars: usize,
    content_max_chars: usize,
    link_limit: usize,
}

impl Extractor {
    /// Creates an extractor bounded by the configured limits
    pub fn new(scope: DomainScope, config: &ExtractorConfig, same_domain_only: bool) -> Self {
        Self {
            scope,
            same_domain_only,
            title_max_chars: config.title_max_chars,
            content_max_chars: config.content_max_chars,
            link_limit: config.max_links,
        }
    }

    /// Overrides the number of links kept per page
    pub fn with_link_limit(mut self, limit: usize) -> Self {
        self.link_limit = limit;
        self
    }

    /// Extracts a page, downgrading any failure to [`Extraction::degraded`]
    ///
    /// # Example
    ///
    /// ```
    /// use site_harvest::config::{DomainMatch, ExtractorConfig};
    /// use site_harvest::crawler::Extractor;
    /// use site_harvest::url::DomainScope;
    /// use url::Url;
    ///
    /// let page = Url::parse("https://example.com/").unwrap();
    /// let scope = DomainScope::from_url(&page, DomainMatch::Exact).unwrap();
    /// let extractor = Extractor::new(scope, &ExtractorConfig::default(), true);
    ///
    /// let html = br#"<html><head><title>Home</title></head>
    ///     <body><main>Welcome <a href="/about">About us</a></main></body></html>"#;
    /// let extraction = extractor.extract(html, &page);
    /// assert_eq!(extraction.title, "Home");
    /// assert_eq!(extraction.content, "Welcome About us");
    /// assert_eq!(extraction.links[0].as_str(), "https://example.com/about");
    /// ```
    pub fn extract(&self, body: &[u8], page_url: &Url) -> Extraction {
        match self.try_extract(body, page_url) {
            Ok(extraction) => extraction,
            Err(e) => {
                tracing::debug!("Degraded extraction for {}: {}", page_url, e);
                Extraction::degraded()
            }
        }
    }

    /// Extracts a page, reporting why a body could not be read
    ///
    /// Bytes that are not UTF-8 (legacy single-byte charsets) are decoded
    /// lossily; only a body without any markup is rejected.
    pub fn try_extract(&self, body: &[u8], page_url: &Url) -> Result<Extraction, ExtractError> {
        let html = String::from_utf8_lossy(body);
        if !html.contains('<') {
            return Err(ExtractError::NotHtml);
        }

        let document = Html::parse_document(&html);

        let title = extract_title(&document)
            .map(|t| truncate_chars(&t, self.title_max_chars))
            .unwrap_or_else(|| NO_TITLE.to_string());

        let description = extract_description(&document);
        let body_text = collapse_whitespace(&extract_body_text(&document));

        let combined = match &description {
            Some(desc) if !body_text.is_empty() => format!("{}\n\n{}", desc, body_text),
            Some(desc) => desc.clone(),
            None => body_text,
        };
        let content = truncate_chars(&combined, self.content_max_chars)
            .trim_end()
            .to_string();
        let word_count = content.split_whitespace().count();

        let links = self.extract_links(&document, page_url);

        Ok(Extraction {
            title,
            description,
            content,
            links,
            word_count,
            degraded: false,
        })
    }

    /// Collects anchor targets, resolved, filtered, de-duplicated and capped
    fn extract_links(&self, document: &Html, page_url: &Url) -> Vec<Url> {
        let mut links = Vec::new();
        let mut seen = HashSet::new();

        let Ok(a_selector) = Selector::parse("a[href]") else {
            return links;
        };

        for element in document.select(&a_selector) {
            if links.len() >= self.link_limit {
                break;
            }

            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                continue;
            }

            let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, page_url))
            else {
                continue;
            };

            if self.same_domain_only
                && (is_document(&url) || is_social(&url) || !self.scope.contains(&url))
            {
                continue;
            }

            if seen.insert(url.as_str().to_string()) {
                links.push(url);
            }
        }

        links
    }
}

/// Resolves a link href to a normalized absolute URL
///
/// Returns None if the link should be excluded:
/// - empty and fragment-only hrefs
/// - javascript:, mailto:, tel: and data: targets
/// - anything that is not http(s) after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    normalize_parsed(absolute).ok()
}

/// Extracts the first non-empty `<title>`
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Extracts `<meta name="description">`
fn extract_description(document: &Html) -> Option<String> {
    let meta_selector = Selector::parse(r#"meta[name="description"][content]"#).ok()?;

    document
        .select(&meta_selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
}

/// Picks the content area and returns its raw text
fn extract_body_text(document: &Html) -> String {
    for area in CONTENT_AREAS {
        let Ok(selector) = Selector::parse(area) else {
            continue;
        };

        for candidate in document.select(&selector) {
            let text = element_text(candidate, &[]);
            if !text.trim().is_empty() {
                return text;
            }
        }
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    element_text(body, CHROME)
}

/// Concatenates descendant text nodes, separated by spaces
///
/// Subtrees rooted at `NEVER_TEXT` elements and at `also_skip` elements are
/// left out. Comments are not text nodes and never appear.
fn element_text(root: ElementRef<'_>, also_skip: &[&str]) -> String {
    let mut out = String::new();
    let mut stack: Vec<_> = root.children().collect();
    stack.reverse();

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                out.push(' ');
                out.push_str(text);
            }
            Node::Element(element) => {
                let name = element.name();
                if NEVER_TEXT.contains(&name) || also_skip.contains(&name) {
                    continue;
                }
                let mut children: Vec<_> = node.children().collect();
                children.reverse();
                stack.extend(children);
            }
            _ => {}
        }
    }

    out
}

/// Collapses whitespace runs (including non-breaking spaces) to single spaces
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max` characters
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
