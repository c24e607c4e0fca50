use crate::page::{ensure_not_empty, parse_selector, LinkExtractor, PageResult};
use scraper::{ElementRef, Html, Selector};

/// Extracts anchors inside a scope element whose `href` mentions the site domain
///
/// When the page has no element matching the scope selector, the whole
/// document is scanned instead.
#[derive(Debug)]
pub struct ScopedLinkExtractor {
    scope: Selector,
    anchors: Selector,
    domain: String,
}

impl ScopedLinkExtractor {
    /// Creates an extractor
    ///
    /// # Arguments
    ///
    /// * `scope` - CSS selector bounding the part of the page that is scanned
    /// * `domain` - Site domain an `href` must contain to be reported
    pub fn new(scope: &str, domain: impl Into<String>) -> PageResult<Self> {
        Ok(Self {
            scope: parse_selector(scope)?,
            anchors: parse_selector("a[href]")?,
            domain: domain.into(),
        })
    }

    fn collect_from(&self, root: ElementRef<'_>, links: &mut Vec<String>) {
        for anchor in root.select(&self.anchors) {
            if let Some(href) = anchor.value().attr("href") {
                if href.contains(&self.domain) {
                    links.push(href.to_string());
                }
            }
        }
    }
}

impl LinkExtractor for ScopedLinkExtractor {
    fn extract_links(&self, html: &str) -> PageResult<Vec<String>> {
        ensure_not_empty(html)?;
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        let mut scopes = document.select(&self.scope).peekable();
        if scopes.peek().is_none() {
            tracing::trace!("No link scope element, scanning whole document");
            self.collect_from(document.root_element(), &mut links);
        } else {
            for scope in scopes {
                self.collect_from(scope, &mut links);
            }
        }

        Ok(links)
    }
}
