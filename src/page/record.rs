use crate::page::{
    element_text, ensure_not_empty, parse_selector, FieldExtractor, PageError, PageResult,
};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;

/// Label the site shows when a book cannot be ordered
const SOLD_OUT: &str = "Vypredané";

/// Structured fields of one catalog book page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookRecord {
    pub title: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub details: BTreeMap<String, String>,
    pub full_price: Option<String>,
    /// `None` when the book is not discounted
    pub discounted_price: Option<String>,
    pub rating: Option<String>,
    pub availability: String,
    pub annotation: Option<String>,
}

/// Extracts [`BookRecord`]s from catalog detail pages
#[derive(Debug)]
pub struct BookExtractor {
    title: Selector,
    authors: Selector,
    details: Selector,
    anchors: Selector,
    detail_terms: Selector,
    detail_values: Selector,
    price_section: Selector,
    strikethrough: Selector,
    price_box: Selector,
    rating: Selector,
    status: Selector,
    annotation: Selector,
}

impl BookExtractor {
    pub fn new() -> PageResult<Self> {
        Ok(Self {
            title: parse_selector("h1.product-detail__title")?,
            authors: parse_selector("ul.product-detail__author a")?,
            details: parse_selector("section#details")?,
            anchors: parse_selector("a")?,
            detail_terms: parse_selector("dt")?,
            detail_values: parse_selector("dd")?,
            price_section: parse_selector("div.tabs section#web")?,
            strikethrough: parse_selector("span.text-strikethrough")?,
            price_box: parse_selector("div.price-box__price")?,
            rating: parse_selector("div.rating-text__value span.text-bold")?,
            status: parse_selector("a#web-label span.status")?,
            annotation: parse_selector("section#description div.cms-article")?,
        })
    }

    fn first_text(&self, document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
    }

    fn prices(&self, document: &Html) -> (Option<String>, Option<String>) {
        let Some(section) = document.select(&self.price_section).next() else {
            return (None, None);
        };

        let shown = section
            .select(&self.price_box)
            .next()
            .map(|el| strip_currency(&element_text(el)));
        let struck = section
            .select(&self.strikethrough)
            .next()
            .map(|el| strip_currency(&element_text(el)));

        match struck {
            Some(full) => (Some(full), shown),
            None => (shown, None),
        }
    }
}

impl FieldExtractor for BookExtractor {
    type Record = BookRecord;

    fn extract(&self, html: &str) -> PageResult<BookRecord> {
        ensure_not_empty(html)?;
        let document = Html::parse_document(html);

        let title = self
            .first_text(&document, &self.title)
            .ok_or(PageError::MissingField("title"))?;

        let details_section = document
            .select(&self.details)
            .next()
            .ok_or(PageError::MissingField("details"))?;

        let mut categories: Vec<String> = Vec::new();
        for anchor in details_section.select(&self.anchors) {
            let text = element_text(anchor);
            if !text.is_empty() && !categories.contains(&text) {
                categories.push(text);
            }
        }

        // The detail list ends at the first blank term; the rest is layout.
        let details = details_section
            .select(&self.detail_terms)
            .map(element_text)
            .zip(details_section.select(&self.detail_values).map(element_text))
            .take_while(|(term, _)| !term.is_empty())
            .collect();

        let authors = document
            .select(&self.authors)
            .map(element_text)
            .filter(|name| !name.is_empty())
            .collect();

        let (full_price, discounted_price) = self.prices(&document);

        let availability = self
            .first_text(&document, &self.status)
            .unwrap_or_else(|| SOLD_OUT.to_string());

        let annotation = self
            .first_text(&document, &self.annotation)
            .map(|text| text.replace('\n', ""));

        Ok(BookRecord {
            title,
            authors,
            categories,
            details,
            full_price,
            discounted_price,
            rating: self.first_text(&document, &self.rating),
            availability,
            annotation,
        })
    }
}

/// Drops the trailing currency symbol from a displayed price
fn strip_currency(price: &str) -> String {
    price
        .trim()
        .trim_end_matches(|c: char| !c.is_ascii_digit())
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAGE: &str = r#"<html><body>
        <h1 class="product-detail__title"> Malý princ </h1>
        <ul class="product-detail__author"><li><a href="/a/1">Antoine de Saint-Exupéry</a></li></ul>
        <div class="rating-text__value"><span class="text-bold">4,8</span></div>
        <div class="tabs"><section id="web">
            <span class="text-strikethrough">12,90 €</span>
            <div class="price-box__price">9,99 €</div>
        </section></div>
        <a id="web-label"><span class="status">Na sklade</span></a>
        <section id="details">
            <a href="/knihy/beletria">Beletria</a>
            <a href="/knihy/pre-deti">Pre deti</a>
            <a href="/knihy/beletria">Beletria</a>
            <dl>
                <dt>Jazyk</dt><dd>slovenský</dd>
                <dt>Počet strán</dt><dd>96</dd>
                <dt></dt><dd>ignored</dd>
                <dt>Late</dt><dd>ignored too</dd>
            </dl>
        </section>
        <section id="description"><div class="cms-article">Prvý riadok
Druhý riadok</div></section>
    </body></html>"#;

    #[test]
    fn test_extracts_all_fields() {
        let record = BookExtractor::new().unwrap().extract(FULL_PAGE).unwrap();

        assert_eq!(record.title, "Malý princ");
        assert_eq!(record.authors, vec!["Antoine de Saint-Exupéry"]);
        assert_eq!(record.categories, vec!["Beletria", "Pre deti"]);
        assert_eq!(record.details.len(), 2);
        assert_eq!(record.details["Jazyk"], "slovenský");
        assert_eq!(record.details["Počet strán"], "96");
        assert_eq!(record.full_price.as_deref(), Some("12,90"));
        assert_eq!(record.discounted_price.as_deref(), Some("9,99"));
        assert_eq!(record.rating.as_deref(), Some("4,8"));
        assert_eq!(record.availability, "Na sklade");
        assert_eq!(record.annotation.as_deref(), Some("Prvý riadokDruhý riadok"));
    }

    #[test]
    fn test_optional_fields_default() {
        let html = r#"<html><body>
            <h1 class="product-detail__title">Bez zľavy</h1>
            <div class="tabs"><section id="web"><div class="price-box__price">15,00 €</div></section></div>
            <section id="details"><dl><dt>Jazyk</dt><dd>slovenský</dd></dl></section>
        </body></html>"#;

        let record = BookExtractor::new().unwrap().extract(html).unwrap();

        assert_eq!(record.full_price.as_deref(), Some("15,00"));
        assert_eq!(record.discounted_price, None);
        assert_eq!(record.rating, None);
        assert_eq!(record.availability, SOLD_OUT);
        assert_eq!(record.annotation, None);
        assert!(record.authors.is_empty());
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let html = r#"<html><body><section id="details"></section></body></html>"#;
        assert!(matches!(
            BookExtractor::new().unwrap().extract(html),
            Err(PageError::MissingField("title"))
        ));
    }

    #[test]
    fn test_missing_details_is_an_error() {
        let html = r#"<html><body><h1 class="product-detail__title">T</h1></body></html>"#;
        assert!(matches!(
            BookExtractor::new().unwrap().extract(html),
            Err(PageError::MissingField("details"))
        ));
    }

    #[test]
    fn test_strip_currency() {
        assert_eq!(strip_currency("12,90 €"), "12,90");
        assert_eq!(strip_currency(" 7 Kč "), "7");
        assert_eq!(strip_currency("9.99"), "9.99");
    }
}
