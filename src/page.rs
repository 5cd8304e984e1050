//! Episode page inspection.
//!
//! Two concerns share this client, both driven by an entry's link page:
//! release-readiness (the broadcaster's page carries an availability note
//! once the media can actually be played — feeds list future episodes
//! ahead of time) and thumbnail discovery via the page's `og:image`
//! metadata tag.

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use regex::Regex;
use tracing::debug;

/// Fetches and inspects episode pages
pub struct PageClient {
    /// HTTP client for fetching pages and images
    http_client: reqwest::Client,
}

impl PageClient {
    /// Create a new page client
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(fetch: &FetchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(fetch.timeout_secs))
            .user_agent(fetch.user_agent.clone())
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Check whether an episode's page contains the release marker
    ///
    /// A non-success HTTP status counts as "not released" — the page not
    /// being served yet is exactly the situation the check exists for.
    ///
    /// # Errors
    /// Returns error only on transport failure; the caller treats that as
    /// equivalent to "not released" for the current poll.
    pub async fn contains_marker(&self, url: &str, marker: &str) -> Result<bool> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "Episode page not available");
            return Ok(false);
        }

        let body = response.text().await?;
        Ok(body.contains(marker))
    }

    /// Extract the thumbnail URL from an episode page's `og:image` tag
    ///
    /// Returns `Ok(None)` when the page has no such tag.
    ///
    /// # Errors
    /// Returns error if the page cannot be fetched.
    pub async fn thumbnail_url(&self, url: &str) -> Result<Option<String>> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Other(format!(
                "Episode page returned HTTP {}: {}",
                status.as_u16(),
                url
            )));
        }

        let body = response.text().await?;
        Ok(extract_og_image(&body))
    }

    /// Fetch an image, returning its raw bytes
    ///
    /// # Errors
    /// Returns error if the request fails or returns a non-success status.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Other(format!(
                "Image returned HTTP {}: {}",
                status.as_u16(),
                url
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Pull the `og:image` content URL out of an HTML document
fn extract_og_image(html: &str) -> Option<String> {
    let pattern = Regex::new(r#"<meta property="og:image"\s+content="([^"]+)""#).ok()?;
    pattern
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
