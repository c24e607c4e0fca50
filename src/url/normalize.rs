/// Normalizes a raw hyperlink target into an absolute URL string
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Strip a protocol-relative `//` prefix
/// 3. Prefix `https://` unless the link already carries an http(s) scheme
///
/// This is a purely textual step; host casing, default ports and fragments
/// are dealt with when a link is canonicalized against the site scope.
/// Applying it twice yields the same string as applying it once.
///
/// # Examples
///
/// ```
/// use catalog_harvest::url::normalize_link;
///
/// assert_eq!(normalize_link("//x.test/?uItem=1"), "https://x.test/?uItem=1");
/// assert_eq!(normalize_link("http://x.test/knihy"), "http://x.test/knihy");
/// ```
pub fn normalize_link(raw: &str) -> String {
    let link = raw.trim();
    let link = link.strip_prefix("//").unwrap_or(link);

    if has_http_scheme(link) {
        link.to_string()
    } else {
        format!("https://{}", link)
    }
}

fn has_http_scheme(link: &str) -> bool {
    let lower = link.get(..8).unwrap_or(link).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
