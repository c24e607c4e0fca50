use url::Url;

/// Extracts the site domain from a URL
///
/// The host is lowercased and a leading `www.` is dropped, so the entry URL
/// `https://www.martinus.sk/` yields `martinus.sk`. Returns `None` for URLs
/// without a host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use catalog_harvest::url::site_domain;
///
/// let url = Url::parse("https://WWW.Martinus.sk/").unwrap();
/// assert_eq!(site_domain(&url), Some("martinus.sk".to_string()));
/// ```
pub fn site_domain(url: &Url) -> Option<String> {
    url.host_str().map(|host| {
        let host = host.to_lowercase();
        match host.strip_prefix("www.") {
            Some(bare) if !bare.is_empty() => bare.to_string(),
            _ => host,
        }
    })
}
