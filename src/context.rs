//! # Context Assembly
//!
//! Serializes a [`CrawlResult`] into the bounded text block embedded in the
//! system prompt. Pages are taken in discovery order; each contributes its URL
//! and the head of its text. Assembly stops at the first page whose block
//! would push the context past the budget, so pages are either included whole
//! or not at all.

use tracing::debug;

use crate::config::SiteProfile;
use crate::crawler::CrawlResult;

/// Default budget for the whole context, in characters
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 8000;

/// Default number of characters kept from each page
pub const DEFAULT_PAGE_CHARS: usize = 1000;

/// Options for context assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Origin named in the preamble, e.g. `https://innovativeskillsbd.com`
    pub source: String,

    /// Maximum length of the assembled context, in characters
    pub max_chars: usize,

    /// Number of characters kept from each page's text
    pub page_chars: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self::for_site(&SiteProfile::default())
    }
}

impl ContextOptions {
    /// Options naming the site's canonical origin in the preamble
    pub fn for_site(profile: &SiteProfile) -> Self {
        Self {
            source: profile.canonical_origin(),
            max_chars: DEFAULT_MAX_CONTEXT_CHARS,
            page_chars: DEFAULT_PAGE_CHARS,
        }
    }

    /// Set the context budget
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Name a different origin in the preamble
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Fixed first line of every context
    pub fn preamble(&self) -> String {
        format!("Content from {} website:\n\n", self.source)
    }
}

/// Format one page as it appears in the context
///
/// The ellipsis is appended whether or not the text was actually cut.
pub fn format_page_block(url: &str, text: &str, page_chars: usize) -> String {
    let head: String = text.chars().take(page_chars).collect();
    format!("Page: {}\n{}...\n\n", url, head)
}

/// Build the context string for a crawl
///
/// # Arguments
///
/// * `crawl` - Pages in discovery order
/// * `options` - Budget and preamble settings
///
/// # Returns
///
/// The preamble followed by as many whole page blocks as fit in `max_chars`
pub fn assemble_context(crawl: &CrawlResult, options: &ContextOptions) -> String {
    let mut context = options.preamble();
    let mut length = context.chars().count();
    let mut included = 0;

    for (url, text) in crawl.iter() {
        let block = format_page_block(url, text, options.page_chars);
        let block_length = block.chars().count();
        if length + block_length > options.max_chars {
            break;
        }
        context.push_str(&block);
        length += block_length;
        included += 1;
    }

    debug!(
        "Assembled context from {} of {} pages ({} chars)",
        included,
        crawl.len(),
        length
    );
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawl(pages: &[(&str, &str)]) -> CrawlResult {
        pages
            .iter()
            .map(|(url, text)| (url.to_string(), text.to_string()))
            .collect()
    }

    #[test]
    fn test_preamble_and_block_format() {
        let context = assemble_context(
            &crawl(&[("https://site/x", "Our courses help students get jobs.")]),
            &ContextOptions::default(),
        );

        assert_eq!(
            context,
            "Content from https://innovativeskillsbd.com website:\n\n\
             Page: https://site/x\nOur courses help students get jobs....\n\n"
        );
    }

    #[test]
    fn test_page_text_is_cut_to_page_chars() {
        let long = "a".repeat(1500);
        let block = format_page_block("https://site/long", &long, 1000);

        assert_eq!(block, format!("Page: https://site/long\n{}...\n\n", "a".repeat(1000)));
    }

    #[test]
    fn test_cut_counts_characters_not_bytes() {
        let text = "é".repeat(5);
        assert_eq!(format_page_block("u", &text, 3), "Page: u\nééé...\n\n");
    }

    #[test]
    fn test_budget_drops_later_pages_whole() {
        let pages = crawl(&[
            ("https://site/1", "one ".repeat(100).as_str()),
            ("https://site/2", "two ".repeat(100).as_str()),
            ("https://site/3", "three ".repeat(100).as_str()),
        ]);
        let options = ContextOptions::default();
        let preamble_len = options.preamble().chars().count();
        let first_block = format_page_block("https://site/1", pages.get("https://site/1").unwrap(), 1000);
        let budget = preamble_len + first_block.chars().count() + 50;

        let context = assemble_context(&pages, &options.with_max_chars(budget));

        assert!(context.chars().count() <= budget);
        assert!(context.contains("Page: https://site/1"));
        assert!(!context.contains("https://site/2"));
        assert!(!context.contains("two"));
        assert!(!context.contains("https://site/3"));
    }

    #[test]
    fn test_stops_at_first_page_that_does_not_fit() {
        // The third page would fit on its own but comes after one that does not.
        let pages = crawl(&[
            ("https://site/a", "short"),
            ("https://site/b", "x".repeat(900).as_str()),
            ("https://site/c", "tiny"),
        ]);
        let options = ContextOptions::default().with_max_chars(200);

        let context = assemble_context(&pages, &options);

        assert!(context.contains("https://site/a"));
        assert!(!context.contains("https://site/b"));
        assert!(!context.contains("https://site/c"));
    }

    #[test]
    fn test_exact_fit_is_included() {
        let pages = crawl(&[("https://site/a", "hello")]);
        let options = ContextOptions::default();
        let budget = options.preamble().chars().count()
            + format_page_block("https://site/a", "hello", 1000).chars().count();

        let context = assemble_context(&pages, &options.with_max_chars(budget));

        assert_eq!(context.chars().count(), budget);
        assert!(context.ends_with("hello...\n\n"));
    }

    #[test]
    fn test_empty_crawl_yields_preamble_only() {
        let options = ContextOptions::default();
        assert_eq!(assemble_context(&CrawlResult::default(), &options), options.preamble());
    }

    #[test]
    fn test_source_names_the_preamble() {
        let options = ContextOptions::default().with_source("https://example.com");
        let context = assemble_context(&crawl(&[("https://example.com/a", "hi")]), &options);
        assert!(context.starts_with("Content from https://example.com website:\n\n"));
    }
}
