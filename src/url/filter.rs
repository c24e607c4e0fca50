use crate::url::SiteScope;
use std::collections::HashSet;

/// Narrows a batch of raw links to new, in-scope, canonical URLs
///
/// Each link is normalized and canonicalized against `scope`; links that are
/// neither detail nor listing pages are dropped, as are links for which
/// `is_explored` returns true. Survivors are deduplicated within the batch
/// and returned in first-seen order.
///
/// The explored check runs on the canonical form, so re-filtering the output
/// against an explored set that already holds it yields nothing.
///
/// # Examples
///
/// ```
/// use catalog_harvest::url::{filter_batch, SiteScope};
/// use std::collections::HashSet;
///
/// let scope = SiteScope::new("https://x.test/", "uItem", "/knihy").unwrap();
/// let links = ["//x.test/?uItem=1", "https://x.test/?uItem=1", "https://other.test/?uItem=2"];
/// let explored: HashSet<String> = HashSet::new();
///
/// let survivors = filter_batch(links, &scope, |url| explored.contains(url));
/// assert_eq!(survivors, vec!["https://x.test/?uItem=1".to_string()]);
/// ```
pub fn filter_batch<I, S, F>(links: I, scope: &SiteScope, is_explored: F) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    let mut seen = HashSet::new();
    let mut survivors = Vec::new();

    for link in links {
        let canonical = match scope.canonicalize(link.as_ref()) {
            Some(canonical) => canonical,
            None => continue,
        };

        if is_explored(&canonical) {
            continue;
        }

        if seen.insert(canonical.clone()) {
            survivors.push(canonical);
        }
    }

    survivors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> SiteScope {
        SiteScope::new("https://x.test/", "uItem", "/knihy").unwrap()
    }

    fn explored(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_dedup_domain_filter_and_scheme_fix_in_one_pass() {
        let links = [
            "//x.test/?uItem=1",
            "https://x.test/?uItem=1",
            "https://other.test/?uItem=2",
        ];
        let explored = explored(&[]);

        let survivors = filter_batch(links, &scope(), |u| explored.contains(u));
        assert_eq!(survivors, vec!["https://x.test/?uItem=1".to_string()]);
    }

    #[test]
    fn test_explored_urls_removed() {
        let links = ["https://x.test/?uItem=1", "//x.test/?uItem=2", "https://x.test/knihy/a"];
        let explored = explored(&["https://x.test/?uItem=2", "https://x.test/knihy/a"]);

        let survivors = filter_batch(links, &scope(), |u| explored.contains(u));
        assert_eq!(survivors, vec!["https://x.test/?uItem=1".to_string()]);
    }

    #[test]
    fn test_other_shapes_dropped() {
        let links = [
            "https://x.test/kontakt",
            "https://x.test/?uItem=abc",
            "javascript:void(0)",
            "",
        ];
        let survivors = filter_batch(links, &scope(), |_| false);
        assert!(survivors.is_empty());
    }

    #[test]
    fn test_refiltering_output_yields_nothing() {
        let links = vec![
            "//x.test/?uItem=1".to_string(),
            "https://x.test/knihy/novinky#top".to_string(),
            "x.test/knihy/novinky".to_string(),
            "https://x.test/?uItem=9".to_string(),
            "https://elsewhere.test/knihy".to_string(),
        ];
        let mut explored = explored(&["https://x.test/?uItem=9"]);

        let first = filter_batch(&links, &scope(), |u| explored.contains(u));
        assert_eq!(first.len(), 2);

        explored.extend(first.iter().cloned());
        let second = filter_batch(&first, &scope(), |u| explored.contains(u));
        assert!(second.is_empty());
    }

    #[test]
    fn test_filtering_is_idempotent_without_explored() {
        let links = ["//x.test/?uItem=3", "https://x.test/knihy", "//x.test/knihy"];
        let first = filter_batch(links, &scope(), |_| false);
        let second = filter_batch(&first, &scope(), |_| false);
        assert_eq!(first, second);
    }
}
