//! # URL Correction
//!
//! Language models regularly misspell the site's domain when they cite pages.
//! [`UrlCorrector`] finds every URL in a reply and rewrites those that use a
//! known misspelling onto the canonical domain.
//!
//! The rewrite keeps only the path: query strings and fragments are dropped.

use regex::Regex;
use tracing::debug;

use crate::config::SiteProfile;

/// Loose URL pattern: scheme, then everything up to the next whitespace
const URL_PATTERN: &str = r"https?://[^\s/$.?#].[^\s]*";

/// Rewrites misspelled site URLs in model output
#[derive(Debug, Clone)]
pub struct UrlCorrector {
    pattern: Regex,
    canonical_domain: String,
    misspelled_domains: Vec<String>,
}

impl UrlCorrector {
    /// Create a corrector for the given canonical domain and misspellings
    pub fn new(canonical_domain: impl Into<String>, misspelled_domains: Vec<String>) -> Self {
        Self {
            pattern: Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"),
            canonical_domain: canonical_domain.into(),
            misspelled_domains,
        }
    }

    /// Create a corrector from a site profile
    pub fn for_site(profile: &SiteProfile) -> Self {
        Self::new(
            profile.canonical_domain.clone(),
            profile.misspelled_domains.clone(),
        )
    }

    /// Whether `url` should be rewritten
    pub fn needs_correction(&self, url: &str) -> bool {
        self.misspelled_domains
            .iter()
            .any(|domain| url.contains(domain.as_str()))
            && !url.contains(self.canonical_domain.as_str())
    }

    /// Canonical form of a misspelled URL: `https://<canonical><path>`
    pub fn canonical_url(&self, url: &str) -> String {
        format!("https://{}{}", self.canonical_domain, url_path(url))
    }

    /// Rewrite every misspelled URL in `text`
    ///
    /// Each URL is matched against the original text, then every literal
    /// occurrence of it is replaced, wherever it appears.
    pub fn correct(&self, text: &str) -> String {
        let mut corrected = text.to_string();

        for found in self.pattern.find_iter(text) {
            let url = found.as_str();
            if !self.needs_correction(url) {
                continue;
            }
            let replacement = self.canonical_url(url);
            debug!("Correcting URL {} -> {}", url, replacement);
            corrected = corrected.replace(url, &replacement);
        }

        corrected
    }
}

impl Default for UrlCorrector {
    fn default() -> Self {
        Self::for_site(&SiteProfile::default())
    }
}

/// Path component of an absolute URL, without query, fragment or the
/// `;params` of its last segment
///
/// Works on the raw string so malformed URLs from model output still yield
/// a path. A URL with nothing after the host has an empty path.
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let after_host = match rest.find(['/', '?', '#']) {
        Some(start) => &rest[start..],
        None => "",
    };
    let end = after_host.find(['?', '#']).unwrap_or(after_host.len());
    let path = &after_host[..end];

    let last_segment = path.rfind('/').unwrap_or(0);
    match path[last_segment..].find(';') {
        Some(params) => &path[..last_segment + params],
        None => path,
    }
}
