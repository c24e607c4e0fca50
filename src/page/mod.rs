//! Page module for the pluggable single-document collaborators
//!
//! Everything here is a stateless function over one HTML document:
//! - `PageClassifier`: decides whether a fetched page is worth keeping
//! - `LinkExtractor`: lists the same-site hyperlinks a page contains
//! - `FieldExtractor`: turns a kept page into a structured record
//!
//! The crawler only depends on the traits, so each piece can be swapped
//! without touching the coordination engine.

mod classifier;
mod links;
mod record;

pub use classifier::CatalogClassifier;
pub use links::ScopedLinkExtractor;
pub use record::{BookExtractor, BookRecord};

use scraper::{ElementRef, Selector};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while processing a single page
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid selector: {0}")]
    Selector(String),
}

/// Result type for page operations
pub type PageResult<T> = Result<T, PageError>;

/// Decides whether a fetched page belongs to the harvested subset
pub trait PageClassifier: Send + Sync {
    fn is_in_scope(&self, html: &str) -> PageResult<bool>;
}

/// Lists the raw same-site hyperlink targets found in a page
pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, html: &str) -> PageResult<Vec<String>>;
}

/// Turns a kept page into a structured record
pub trait FieldExtractor: Send + Sync {
    type Record: Serialize;

    fn extract(&self, html: &str) -> PageResult<Self::Record>;
}

pub(crate) fn parse_selector(css: &str) -> PageResult<Selector> {
    Selector::parse(css).map_err(|e| PageError::Selector(format!("{}: {:?}", css, e)))
}

pub(crate) fn ensure_not_empty(html: &str) -> PageResult<()> {
    if html.trim().is_empty() {
        Err(PageError::EmptyDocument)
    } else {
        Ok(())
    }
}

/// Collects an element's text with surrounding whitespace removed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selector_rejects_garbage() {
        assert!(parse_selector("main a[href]").is_ok());
        assert!(matches!(
            parse_selector("main >>> ["),
            Err(PageError::Selector(_))
        ));
    }

    #[test]
    fn test_ensure_not_empty() {
        assert!(ensure_not_empty("<html></html>").is_ok());
        assert!(matches!(
            ensure_not_empty("  \n "),
            Err(PageError::EmptyDocument)
        ));
    }
}
