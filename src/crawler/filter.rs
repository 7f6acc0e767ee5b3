//! Same-origin link filtering
//!
//! Scope is decided on the network location as it is written in the link,
//! compared case-sensitively. `EXAMPLE.com` and `example.com:443` are
//! different locations from `example.com` here, even though they name the same
//! server.

use url::Url;

/// Split a leading `scheme:` off a URL string
fn split_scheme(url: &str) -> (Option<&str>, &str) {
    if let Some(colon) = url.find(':') {
        let scheme = &url[..colon];
        let mut chars = scheme.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if valid {
            return (Some(scheme), &url[colon + 1..]);
        }
    }
    (None, url)
}

/// The authority after `//`, up to the next `/`, `?` or `#`
fn authority(rest: &str) -> Option<&str> {
    let after = rest.strip_prefix("//")?;
    let end = after.find(['/', '?', '#']).unwrap_or(after.len());
    Some(&after[..end])
}

/// Network location of a URL string, exactly as written
///
/// This is the `[user[:password]@]host[:port]` text between `//` and the
/// path. URLs without one (`mailto:`, `javascript:`, relative paths) yield an
/// empty string.
pub fn network_location(url: &str) -> &str {
    let (_, rest) = split_scheme(url.trim());
    authority(rest).unwrap_or("")
}

/// Check whether `candidate` is on the same site as `base`
///
/// Only the written network location is compared. Scheme and path are
/// ignored, so `http://example.com/a` is in scope for a crawl rooted at
/// `https://example.com/`.
pub fn is_same_origin(candidate: &str, base: &str) -> bool {
    network_location(candidate) == network_location(base)
}

/// Whether `href` carries its own network location instead of inheriting it
///
/// A link inherits the location of the page it is on unless it names an
/// authority (`//host`) or switches to another scheme.
fn defines_location(href: &str, page_scheme: &str) -> bool {
    let (scheme, rest) = split_scheme(href);
    rest.starts_with("//") || scheme.is_some_and(|s| !s.eq_ignore_ascii_case(page_scheme))
}

/// Resolve `href` found on `page_url` and keep it only if it is in scope
///
/// `page_url` must itself be in scope for `base`, so links that inherit its
/// location are in scope too. Links with their own location are compared
/// against `base` as written.
pub fn resolve_in_scope(href: &str, page_url: &Url, base: &str) -> Option<Url> {
    let href = href.trim();
    if defines_location(href, page_url.scheme()) && !is_same_origin(href, base) {
        return None;
    }
    page_url.join(href).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_host_is_in_scope() {
        assert!(is_same_origin("https://example.com/a", "https://example.com/"));
    }

    #[test]
    fn test_other_host_is_out_of_scope() {
        assert!(!is_same_origin("https://other.com/a", "https://example.com/"));
    }

    #[test]
    fn test_scheme_is_ignored() {
        assert!(is_same_origin("http://example.com/a", "https://example.com/"));
    }

    #[test]
    fn test_subdomain_and_port_must_match_exactly() {
        let base = "https://example.com/";
        assert!(!is_same_origin("https://www.example.com/", base));
        assert!(!is_same_origin("https://example.com:8443/", base));
        assert!(is_same_origin("http://127.0.0.1:8080/x", "http://127.0.0.1:8080/"));
    }

    #[test]
    fn test_location_is_compared_as_written() {
        let base = "https://example.com/";
        assert!(!is_same_origin("https://EXAMPLE.com/a", base));
        assert!(!is_same_origin("https://example.com:443/a", base));
        assert!(!is_same_origin("https://example.com./a", base));
    }

    #[test]
    fn test_userinfo_is_part_of_location() {
        assert_eq!(
            network_location("https://user:pw@example.com:8443/x"),
            "user:pw@example.com:8443"
        );
        assert!(!is_same_origin("https://user@example.com/", "https://example.com/"));
    }

    #[test]
    fn test_hostless_urls_never_match() {
        let base = "https://example.com/";
        assert_eq!(network_location("mailto:team@example.com"), "");
        assert!(!is_same_origin("mailto:team@example.com", base));
        assert!(!is_same_origin("javascript:void(0)", base));
    }

    #[test]
    fn test_location_stops_at_path_query_or_fragment() {
        assert_eq!(network_location("https://example.com"), "example.com");
        assert_eq!(network_location("https://example.com?q=1"), "example.com");
        assert_eq!(network_location("//example.com#top"), "example.com");
        assert_eq!(network_location("/courses/web"), "");
    }

    #[test]
    fn test_resolve_in_scope() {
        let base = "https://example.com/";
        let page = url("https://example.com/courses/");

        assert_eq!(
            resolve_in_scope("web", &page, base).map(String::from).as_deref(),
            Some("https://example.com/courses/web")
        );
        assert_eq!(
            resolve_in_scope("/jobs?page=2", &page, base).map(String::from).as_deref(),
            Some("https://example.com/jobs?page=2")
        );
        assert!(resolve_in_scope("https://other.com/", &page, base).is_none());
        assert!(resolve_in_scope("//other.com/x", &page, base).is_none());
        assert!(resolve_in_scope("mailto:team@example.com", &page, base).is_none());
    }

    #[test]
    fn test_resolve_rejects_differently_written_location() {
        let base = "https://example.com/";
        let page = url("https://example.com/");

        assert!(resolve_in_scope("https://EXAMPLE.com/a", &page, base).is_none());
        assert!(resolve_in_scope("https://example.com:443/a", &page, base).is_none());
        assert!(resolve_in_scope("http://example.com/a", &page, base).is_some());
    }
}
