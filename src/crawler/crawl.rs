//! Breadth-first same-origin crawl loop

use std::collections::{HashSet, VecDeque};

use chrono::Utc;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::sync::mpsc;
use tracing::{debug, debug_span, info, instrument, warn, Instrument};
use url::Url;

use crate::crawler::content_extraction::parse_page;
use crate::crawler::error::CrawlError;
use crate::crawler::fetch::PageFetcher;
use crate::crawler::filter::resolve_in_scope;
use crate::crawler::{CrawlEvent, CrawlResult, CrawlerConfig};

/// Sequential breadth-first crawler for a single site
///
/// Pages are visited in FIFO order starting from the base URL. Every URL is
/// marked visited before it is fetched, so a page reachable through several
/// links is fetched once. Requests are spaced by the configured rate limit
/// and the crawl stops once `max_pages` URLs have been visited or the
/// frontier runs dry.
pub struct Crawler {
    config: CrawlerConfig,
    fetcher: PageFetcher,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl Crawler {
    /// Create a crawler with the given configuration
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let fetcher = PageFetcher::new(&config)?;
        let limiter = Quota::with_period(config.rate_limit()).map(RateLimiter::direct);
        Ok(Self {
            config,
            fetcher,
            limiter,
        })
    }

    /// The configuration this crawler was built with
    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawl a site starting at `base_url`
    pub async fn crawl(&self, base_url: &str) -> Result<CrawlResult, CrawlError> {
        self.crawl_with_progress(base_url, None).await
    }

    /// Crawl a site, reporting progress on `progress` when given
    ///
    /// Only an unparseable base URL is an error. Pages that fail to fetch or
    /// yield no text are reported as events and the crawl continues.
    #[instrument(skip(self, progress), fields(max_pages = self.config.max_pages))]
    pub async fn crawl_with_progress(
        &self,
        base_url: &str,
        progress: Option<mpsc::Sender<CrawlEvent>>,
    ) -> Result<CrawlResult, CrawlError> {
        let base = Url::parse(base_url)?;
        let max_pages = self.config.max_pages;
        info!("Starting crawl for {}", base);
        notify(
            &progress,
            CrawlEvent::Started {
                base_url: base.to_string(),
                max_pages,
            },
        )
        .await;

        let mut result = CrawlResult::new(base.as_str());
        let mut frontier = VecDeque::from([base.clone()]);
        let mut visited: HashSet<String> = HashSet::new();

        while visited.len() < max_pages {
            let Some(current) = frontier.pop_front() else {
                break;
            };
            if visited.contains(current.as_str()) {
                continue;
            }
            visited.insert(current.to_string());

            notify(
                &progress,
                CrawlEvent::Visiting {
                    url: current.to_string(),
                    visited: visited.len(),
                    max_pages,
                },
            )
            .await;

            self.throttle().await;

            let html = match self.fetcher.fetch(&current).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Error visiting {}: {}", current, e);
                    notify(
                        &progress,
                        CrawlEvent::PageFailed {
                            url: current.to_string(),
                            error: e.to_string(),
                        },
                    )
                    .await;
                    continue;
                }
            };

            let page = parse_page(&html, &self.config.exclude_selectors);
            match page.text {
                Some(text) => result.insert(current.to_string(), text),
                None => {
                    debug!("No text extracted from {}", current);
                    notify(
                        &progress,
                        CrawlEvent::PageSkipped {
                            url: current.to_string(),
                        },
                    )
                    .await;
                }
            }

            let before = frontier.len();
            frontier.extend(
                page.links
                    .iter()
                    .filter_map(|href| resolve_in_scope(href, &current, base_url))
                    .filter(|link| !visited.contains(link.as_str())),
            );
            debug!(
                "Queued {} links from {} (frontier: {})",
                frontier.len() - before,
                current,
                frontier.len()
            );
        }

        result.visited = visited.len();
        result.crawled_at = Some(Utc::now());
        info!(
            "Crawled {} pages and collected content from {} pages",
            result.visited,
            result.len()
        );
        notify(
            &progress,
            CrawlEvent::Finished {
                visited: result.visited,
                collected: result.len(),
            },
        )
        .await;

        Ok(result)
    }

    async fn throttle(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().instrument(debug_span!("limiter")).await;
        }
    }
}

/// Crawl a website with the given configuration
///
/// # Arguments
///
/// * `url` - The URL to start from; also defines the site's network location
/// * `config` - The crawler configuration
///
/// # Returns
///
/// The text of every page that yielded content, in discovery order
pub async fn crawl_website(url: &str, config: CrawlerConfig) -> Result<CrawlResult, CrawlError> {
    Crawler::new(config)?.crawl(url).await
}

async fn notify(progress: &Option<mpsc::Sender<CrawlEvent>>, event: CrawlEvent) {
    if let Some(tx) = progress {
        // A dropped receiver only means nobody is watching.
        let _ = tx.send(event).await;
    }
}
