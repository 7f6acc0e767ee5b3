//! Page fetching for the crawler module

use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::crawler::config::CrawlerConfig;
use crate::crawler::error::CrawlError;

/// Fetches raw HTML for a single page
///
/// Wraps a shared reqwest client configured with the crawl's request timeout
/// and optional user agent. Anything other than `200 OK` is reported as
/// [`CrawlError::Status`]; the caller decides whether that is fatal.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: ReqwestClient,
}

impl PageFetcher {
    /// Create a fetcher from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let mut builder = ReqwestClient::builder().timeout(config.request_timeout());
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Issue one GET request and return the body of a `200 OK` response
    #[instrument(skip(self), fields(url = %url), level = "debug")]
    pub async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!("Non-200 response: {}", status);
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}
