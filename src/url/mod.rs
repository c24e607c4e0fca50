//! URL handling module for Catalog-Harvest
//!
//! This module provides link normalization, site-scope matching, URL shape
//! classification and batch filtering against the explored set. Everything
//! here is pure and needs no synchronization.

mod domain;
mod filter;
mod matcher;
mod normalize;

use crate::config::SiteConfig;
use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::site_domain;
pub use filter::filter_batch;
pub use matcher::host_in_site;
pub use normalize::normalize_link;

/// Shape of a URL relative to the harvested site
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Item detail page carrying a numeric id
    Detail { id: String },
    /// Catalog listing page
    Listing,
    /// Off-site, malformed, or any other shape; dropped
    Other,
}

/// The URL shapes that make up the harvested part of a site
///
/// Built from the entry URL: its origin prefixes canonical item URLs and its
/// domain (without `www.`) bounds which hosts are in scope.
#[derive(Debug, Clone)]
pub struct SiteScope {
    origin: String,
    domain: String,
    detail_param: String,
    listing_prefix: String,
}

impl SiteScope {
    /// Creates a scope from the entry URL and the two URL shape parameters
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_harvest::url::{LinkKind, SiteScope};
    ///
    /// let scope = SiteScope::new("https://www.martinus.sk/", "uItem", "/knihy").unwrap();
    /// assert_eq!(
    ///     scope.classify("https://www.martinus.sk/?uItem=123"),
    ///     LinkKind::Detail { id: "123".to_string() }
    /// );
    /// assert_eq!(scope.classify("https://www.martinus.sk/knihy/beletria"), LinkKind::Listing);
    /// assert_eq!(scope.classify("https://www.martinus.sk/kontakt"), LinkKind::Other);
    /// ```
    pub fn new(entry_url: &str, detail_param: &str, listing_prefix: &str) -> UrlResult<Self> {
        let entry = Url::parse(entry_url).map_err(|e| UrlError::Parse(e.to_string()))?;

        if entry.scheme() != "http" && entry.scheme() != "https" {
            return Err(UrlError::InvalidScheme(entry.scheme().to_string()));
        }

        let domain = site_domain(&entry).ok_or(UrlError::MissingDomain)?;

        Ok(Self {
            origin: entry.origin().ascii_serialization(),
            domain,
            detail_param: detail_param.to_string(),
            listing_prefix: listing_prefix.to_string(),
        })
    }

    /// Creates a scope from the `[site]` configuration section
    pub fn from_config(site: &SiteConfig) -> UrlResult<Self> {
        Self::new(&site.entry_url, &site.detail_param, &site.listing_prefix)
    }

    /// The site domain used for host matching (entry host without `www.`)
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Classifies an absolute URL against the two in-scope shapes
    pub fn classify(&self, url: &str) -> LinkKind {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return LinkKind::Other,
        };
        self.classify_parsed(&parsed)
    }

    fn classify_parsed(&self, url: &Url) -> LinkKind {
        if url.scheme() != "http" && url.scheme() != "https" {
            return LinkKind::Other;
        }

        match url.host_str() {
            Some(host) if host_in_site(&self.domain, host) => {}
            _ => return LinkKind::Other,
        }

        if url.path() == "/" {
            if let Some(id) = url.query().and_then(|q| self.detail_id(q)) {
                return LinkKind::Detail { id };
            }
        }

        if url.path().starts_with(&self.listing_prefix) {
            return LinkKind::Listing;
        }

        LinkKind::Other
    }

    /// Matches a query that is exactly `<detail_param>=<digits>`
    fn detail_id(&self, query: &str) -> Option<String> {
        let value = query
            .strip_prefix(self.detail_param.as_str())?
            .strip_prefix('=')?;

        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            Some(value.to_string())
        } else {
            None
        }
    }

    /// Normalizes, classifies and canonicalizes a raw link
    ///
    /// Returns `None` for links outside the two in-scope shapes. Detail pages
    /// are rewritten to [`SiteScope::detail_url`] so that every spelling of an
    /// item collapses onto the form bootstrap seeding reconstructs; listing
    /// pages keep their parsed serialization minus any fragment.
    pub fn canonicalize(&self, raw: &str) -> Option<String> {
        let mut url = Url::parse(&normalize_link(raw)).ok()?;

        match self.classify_parsed(&url) {
            LinkKind::Detail { id } => Some(self.detail_url(&id)),
            LinkKind::Listing => {
                url.set_fragment(None);
                Some(url.to_string())
            }
            LinkKind::Other => None,
        }
    }

    /// Builds the canonical detail-page URL for an item id
    pub fn detail_url(&self, id: &str) -> String {
        format!("{}/?{}={}", self.origin, self.detail_param, id)
    }

    /// Returns the item id embedded in a detail-page URL
    pub fn item_id(&self, url: &str) -> Option<String> {
        match self.classify(url) {
            LinkKind::Detail { id } => Some(id),
            _ => None,
        }
    }
}
