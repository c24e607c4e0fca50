/// Checks whether a host belongs to the harvested site
///
/// The site domain is compared the way a `*.domain` wildcard would be:
/// the bare domain itself and any subdomain of it match, so
/// `martinus.sk` covers `www.martinus.sk` and `m.martinus.sk`.
///
/// Both arguments are expected to be lowercase already (the `url` crate
/// lowercases hosts when parsing).
///
/// # Examples
///
/// ```
/// use catalog_harvest::url::host_in_site;
///
/// assert!(host_in_site("martinus.sk", "martinus.sk"));
/// assert!(host_in_site("martinus.sk", "www.martinus.sk"));
/// assert!(!host_in_site("martinus.sk", "notmartinus.sk"));
/// ```
pub fn host_in_site(site_domain: &str, candidate: &str) -> bool {
    if site_domain.is_empty() {
        return false;
    }

    candidate == site_domain
        || candidate
            .strip_suffix(site_domain)
            .map(|prefix| prefix.ends_with('.'))
            .unwrap_or(false)
}
