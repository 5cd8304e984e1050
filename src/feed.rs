//! Feed retrieval and parsing.
//!
//! Fetches a show's syndication feed over HTTP and parses it into a flat
//! sequence of [`FeedEntry`] values. Both RSS 2.0 and Atom are supported;
//! content is tried as RSS first with an Atom fallback. The rest of the
//! crate consumes the parsed entries and never touches the wire format.

use crate::config::FetchConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// One item from a show's feed, representing a candidate episode
///
/// Immutable once parsed. The `link` doubles as the unique identifier used
/// for history deduplication.
#[derive(Clone, Debug)]
pub struct FeedEntry {
    /// Episode page link (unique identifier)
    pub link: String,

    /// Episode title
    pub title: String,

    /// Episode description
    pub description: String,

    /// Publication date
    pub published: Option<DateTime<Utc>>,
}

/// Fetches and parses show feeds
pub struct FeedClient {
    /// HTTP client for fetching feeds
    http_client: reqwest::Client,
}

impl FeedClient {
    /// Create a new feed client
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

    /// Fetch and parse a show's feed
    ///
    /// This method:
    /// 1. Fetches the feed content via HTTP
    /// 2. Attempts to parse as RSS, falls back to Atom if that fails
    /// 3. Returns the entries in the order the feed lists them
    ///
    /// Entries without a link are dropped — the link is the identity the
    /// whole pipeline keys on.
    ///
    /// # Errors
    /// Returns error if the HTTP request fails, the response status is not
    /// a success, or the content parses as neither RSS nor Atom.
    pub async fn fetch_entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        debug!(url = %feed_url, "Fetching feed");

        let response = self
            .http_client
            .get(feed_url)
            .send()
            .await
            .map_err(|e| Error::Feed(format!("Failed to fetch feed: {}", e)))?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Feed(format!(
                "Feed returned HTTP {}: {}",
                status.as_u16(),
                feed_url
            )));
        }

        let content = response
            .text()
            .await
            .map_err(|e| Error::Feed(format!("Failed to read feed content: {}", e)))?;

        // Try parsing as RSS first, then Atom
        match self.parse_as_rss(&content) {
            Ok(entries) => {
                debug!(count = entries.len(), "Parsed feed as RSS");
                Ok(entries)
            }
            Err(rss_err) => {
                debug!(error = %rss_err, "Failed to parse as RSS, trying Atom");
                match self.parse_as_atom(&content) {
                    Ok(entries) => {
                        debug!(count = entries.len(), "Parsed feed as Atom");
                        Ok(entries)
                    }
                    Err(atom_err) => Err(Error::Feed(format!(
                        "Failed to parse feed as RSS or Atom. RSS error: {}. Atom error: {}",
                        rss_err, atom_err
                    ))),
                }
            }
        }
    }

    /// Parse feed content as RSS
    fn parse_as_rss(&self, content: &str) -> Result<Vec<FeedEntry>> {
        let channel = content
            .parse::<rss::Channel>()
            .map_err(|e| Error::Feed(format!("RSS parse error: {}", e)))?;

        let entries = channel
            .items()
            .iter()
            .filter_map(|item| {
                let link = match item.link() {
                    Some(l) => l.to_string(),
                    None => {
                        warn!(title = ?item.title(), "Dropping feed item without link");
                        return None;
                    }
                };

                // Parse publication date
                let published = item.pub_date().and_then(|date_str| {
                    chrono::DateTime::parse_from_rfc2822(date_str)
                        .ok()
                        .map(|dt| dt.with_timezone(&Utc))
                });

                Some(FeedEntry {
                    link,
                    title: item.title().unwrap_or("").to_string(),
                    description: item.description().unwrap_or("").to_string(),
                    published,
                })
            })
            .collect();

        Ok(entries)
    }

    /// Parse feed content as Atom
    fn parse_as_atom(&self, content: &str) -> Result<Vec<FeedEntry>> {
        let feed = atom_syndication::Feed::read_from(content.as_bytes())
            .map_err(|e| Error::Feed(format!("Atom parse error: {}", e)))?;

        let entries = feed
            .entries()
            .iter()
            .filter_map(|entry| {
                // Prefer the alternate link, fall back to the first link
                let link = entry
                    .links()
                    .iter()
                    .find(|link| link.rel() == "alternate")
                    .or_else(|| entry.links().first())
                    .map(|link| link.href().to_string());

                let link = match link {
                    Some(l) => l,
                    None => {
                        warn!(title = %entry.title().as_str(), "Dropping feed entry without link");
                        return None;
                    }
                };

                // Publication date (prefer published, fall back to updated)
                let published = entry
                    .published()
                    .copied()
                    .or_else(|| Some(*entry.updated()))
                    .map(|dt| dt.with_timezone(&Utc));

                // Description from summary or content
                let description = entry
                    .summary()
                    .map(|s| s.as_str().to_string())
                    .or_else(|| {
                        entry
                            .content()
                            .and_then(|c| c.value().map(|v| v.to_string()))
                    })
                    .unwrap_or_default();

                Some(FeedEntry {
                    link,
                    title: entry.title().as_str().to_string(),
                    description,
                    published,
                })
            })
            .collect();

        Ok(entries)
    }
}
