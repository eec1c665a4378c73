//! Link extraction from HTML text
//!
//! Two extractors are provided:
//! - [`RegexLinkExtractor`] scans the raw markup for `<a ... href=...>` tags.
//!   It never builds a tree, so every anchor tag in the source counts exactly
//!   once, whatever state the surrounding markup is in. Comments and
//!   `<script>` blocks are removed before scanning, so anchors quoted there
//!   are not links. An unterminated comment or script is left in place.
//! - [`HtmlLinkExtractor`] parses the document with `scraper` and selects
//!   `a[href]` elements. HTML5 tree construction may clone an anchor when it
//!   repairs mis-nested markup, so counts on broken pages can differ from the
//!   source.
//!
//! Neither extractor can fail: garbage in yields fewer links, never an error.

use html_escape::decode_html_entities;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

lazy_static! {
    /// An `<a` tag whose attributes are consumed whole until one is named
    /// `href`, so neither `data-href` nor an `href=` inside another quoted
    /// value matches. The value may be double-quoted, single-quoted or bare.
    static ref ANCHOR_HREF: Regex = Regex::new(
        r#"(?i)<a\s+(?:[^\s"'>=/]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+))?\s+)*?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#
    )
    .expect("Invalid anchor regex");

    /// Markup whose text must not be scanned for anchors
    static ref INERT_MARKUP: Regex =
        Regex::new(r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>").expect("Invalid markup regex");
}

/// Finds raw link targets in an HTML document
pub trait LinkExtractor: Send + Sync {
    /// Returns the raw `href` values of all anchors, in first-appearance order
    fn extract_links(&self, html: &str) -> Vec<String>;
}

/// Source-order anchor scanner (the default extractor)
///
/// # Example
///
/// ```
/// use crawly::crawler::{LinkExtractor, RegexLinkExtractor};
///
/// let html = r#"<a href="https://example.com">Link<p><a href="https://example.org">"#;
/// let links = RegexLinkExtractor.extract_links(html);
/// assert_eq!(links, vec!["https://example.com", "https://example.org"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexLinkExtractor;

impl LinkExtractor for RegexLinkExtractor {
    fn extract_links(&self, html: &str) -> Vec<String> {
        let markup = INERT_MARKUP.replace_all(html, " ");

        ANCHOR_HREF
            .captures_iter(&markup)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
            .map(|value| decode_html_entities(value.as_str()).into_owned())
            .collect()
    }
}

/// Tree-based extractor using `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        let Ok(a_selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        document
            .select(&a_selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}
