//! Page fetching with a browser-like identity.
//!
//! A single shared [`reqwest::Client`] is constructed once and injected into
//! every extractor, so tests can point the pipeline at local fixtures and no
//! global session exists. Fetch failures come back as typed
//! [`ScrapeError::Network`] values; the caller decides whether to surface
//! them. No retries at this layer.

use crate::error::{Result, ScrapeError};
use scraper::Html;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chrome-on-Windows identity; some portals serve stripped markup (or a 403)
/// to unknown agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP fetcher shared by every extractor.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Build a fetcher with the browser user-agent and the fixed 15 s
    /// timeout.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ScrapeError::network("(client init)", e))?;
        Ok(Self { client })
    }

    /// GET a URL and return the response body as text.
    ///
    /// Non-2xx statuses and transport failures both map to
    /// [`ScrapeError::Network`] with the underlying message.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::network(url, format!("HTTP status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::network(url, e))?;
        debug!(bytes = body.len(), %url, "Fetched page");
        Ok(body)
    }

    /// GET a URL and parse the body into an HTML document.
    pub async fn fetch_page(&self, url: &str) -> Result<Html> {
        let body = self.fetch_text(url).await?;
        Ok(Html::parse_document(&body))
    }

    /// Access the underlying client, for callers issuing non-HTML requests
    /// (the analysis service, timedtext XML).
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
