//! Content extraction functionality for the crawler module

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{trace, warn};

/// Text and outgoing links pulled from one HTML document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Visible text with boilerplate removed, `None` when nothing is left
    pub text: Option<String>,

    /// Every `a[href]` value exactly as written, in document order
    pub links: Vec<String>,
}

/// Parse a page once and extract both its text and its links
///
/// Links are collected from the whole document, including the navigation
/// elements that are stripped from the text.
pub fn parse_page(html: &str, exclude_selectors: &[String]) -> ParsedPage {
    let document = Html::parse_document(html);
    ParsedPage {
        text: text_from_document(&document, exclude_selectors),
        links: links_from_document(&document),
    }
}

/// Extract visible text from HTML
///
/// Elements matched by `exclude_selectors` are dropped together with their
/// subtree. Remaining text nodes are trimmed and joined by single spaces, then
/// every whitespace run is collapsed to one space.
///
/// # Returns
///
/// The flattened text, or `None` if the document has no visible text
pub fn extract_text(html: &str, exclude_selectors: &[String]) -> Option<String> {
    if html.trim().is_empty() {
        return None;
    }
    text_from_document(&Html::parse_document(html), exclude_selectors)
}

/// Extract every anchor target from HTML, unresolved
///
/// Resolution happens in [`resolve_in_scope`](crate::crawler::resolve_in_scope),
/// which needs the href as written to judge its network location.
pub fn extract_links(html: &str) -> Vec<String> {
    links_from_document(&Html::parse_document(html))
}

fn text_from_document(document: &Html, exclude_selectors: &[String]) -> Option<String> {
    let mut excluded = HashSet::new();
    for selector_str in exclude_selectors {
        match Selector::parse(selector_str) {
            Ok(selector) => excluded.extend(document.select(&selector).map(|element| element.id())),
            Err(e) => warn!("Failed to parse selector '{}': {}", selector_str, e),
        }
    }

    let fragments: Vec<&str> = document
        .tree
        .root()
        .descendants()
        .filter(|node| !node.ancestors().any(|ancestor| excluded.contains(&ancestor.id())))
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect();

    let text = normalize_whitespace(&fragments.join(" "));
    trace!("Extracted {} characters of text", text.len());

    if text.is_empty() { None } else { Some(text) }
}

fn links_from_document(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(String::from)
        .collect()
}

/// Collapse all whitespace runs to a single space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::CrawlerConfig;

    fn default_excludes() -> Vec<String> {
        CrawlerConfig::default().exclude_selectors
    }

    #[test]
    fn test_boilerplate_is_removed() {
        let html = r#"<html>
            <head><title>Courses</title><style>body { color: red; }</style></head>
            <body>
                <header>Site header</header>
                <nav><a href="/">Home</a><a href="/about">About</a></nav>
                <main><h1>Learn IT</h1><p>Our courses help students get jobs.</p></main>
                <script>var tracking = "secret";</script>
                <footer>Copyright footer</footer>
            </body></html>"#;

        let text = extract_text(html, &default_excludes()).unwrap();

        assert_eq!(text, "Courses Learn IT Our courses help students get jobs.");
        for hidden in ["Site header", "Home", "About", "secret", "color: red", "Copyright"] {
            assert!(!text.contains(hidden), "{hidden:?} leaked into {text:?}");
        }
    }

    #[test]
    fn test_nested_excluded_subtree() {
        let html = "<body><div><nav><ul><li><span>deep menu</span></li></ul></nav><p>kept</p></div></body>";
        assert_eq!(extract_text(html, &default_excludes()).as_deref(), Some("kept"));
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let html = "<body><p>  one\t\ttwo \n\n\n three  </p><div>\r\nfour   five</div>   </body>";
        assert_eq!(
            extract_text(html, &default_excludes()).as_deref(),
            Some("one two three four five")
        );
    }

    #[test]
    fn test_adjacent_nodes_are_space_separated() {
        let html = "<body><p>alpha</p><p>beta</p><span>gamma</span></body>";
        assert_eq!(
            extract_text(html, &default_excludes()).as_deref(),
            Some("alpha beta gamma")
        );
    }

    #[test]
    fn test_comments_are_ignored() {
        let html = "<body><!-- hidden note --><p>shown</p></body>";
        assert_eq!(extract_text(html, &default_excludes()).as_deref(), Some("shown"));
    }

    #[test]
    fn test_empty_or_boilerplate_only_is_none() {
        assert_eq!(extract_text("", &default_excludes()), None);
        assert_eq!(extract_text("   \n ", &default_excludes()), None);
        assert_eq!(
            extract_text("<body><nav>menu</nav><script>x()</script></body>", &default_excludes()),
            None
        );
    }

    #[test]
    fn test_invalid_selector_is_skipped() {
        let excludes = vec!["[[[".to_string(), "nav".to_string()];
        assert_eq!(
            extract_text("<body><nav>menu</nav><p>body</p></body>", &excludes).as_deref(),
            Some("body")
        );
    }

    #[test]
    fn test_links_are_kept_as_written_in_document_order() {
        let html = r#"<body>
            <nav><a href="/">Home</a></nav>
            <a href="web-dev">Web</a>
            <a href="https://other.com/x">Other</a>
            <a>No href</a>
            <a href="../jobs?page=2#top">Jobs</a>
        </body>"#;

        assert_eq!(
            extract_links(html),
            vec!["/", "web-dev", "https://other.com/x", "../jobs?page=2#top"]
        );
    }

    #[test]
    fn test_parse_page_keeps_nav_links_but_not_nav_text() {
        let html = r#"<body><nav><a href="/about">About us</a></nav><p>Welcome</p></body>"#;

        let parsed = parse_page(html, &default_excludes());

        assert_eq!(parsed.text.as_deref(), Some("Welcome"));
        assert_eq!(parsed.links, vec!["/about"]);
    }
}
