use crate::config::ClassifierConfig;
use crate::page::{ensure_not_empty, parse_selector, PageClassifier, PageResult};
use scraper::{Html, Selector};

const BREADCRUMBS: &str = "section.section--breadcrumbs";
const DETAILS: &str = "section#details";

/// Keeps pages whose breadcrumbs name the category and whose details name the language
///
/// Both sections must be present; a page missing either one is out of scope.
#[derive(Debug)]
pub struct CatalogClassifier {
    breadcrumbs: Selector,
    details: Selector,
    category_keyword: String,
    language_keyword: String,
}

impl CatalogClassifier {
    pub fn new(
        category_keyword: impl Into<String>,
        language_keyword: impl Into<String>,
    ) -> PageResult<Self> {
        Ok(Self {
            breadcrumbs: parse_selector(BREADCRUMBS)?,
            details: parse_selector(DETAILS)?,
            category_keyword: category_keyword.into(),
            language_keyword: language_keyword.into(),
        })
    }

    pub fn from_config(config: &ClassifierConfig) -> PageResult<Self> {
        Self::new(&config.category_keyword, &config.language_keyword)
    }

    fn section_mentions(document: &Html, selector: &Selector, keyword: &str) -> bool {
        document
            .select(selector)
            .next()
            .map(|section| section.text().any(|chunk| chunk.contains(keyword)))
            .unwrap_or(false)
    }
}

impl PageClassifier for CatalogClassifier {
    fn is_in_scope(&self, html: &str) -> PageResult<bool> {
        ensure_not_empty(html)?;
        let document = Html::parse_document(html);

        Ok(
            Self::section_mentions(&document, &self.breadcrumbs, &self.category_keyword)
                && Self::section_mentions(&document, &self.details, &self.language_keyword),
        )
    }
}
