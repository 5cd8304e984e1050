//! Core acquisition engine split into focused submodules.
//!
//! The `ShowDownloader` struct and its methods are organized by domain:
//! - [`eligibility`] - Per-entry decision making (dedup, filters, release-readiness)
//! - [`acquisition`] - Per-show and per-cycle orchestration
//! - [`sidecar`] - Metadata (.nfo) and thumbnail writing

mod acquisition;
mod eligibility;
mod sidecar;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use eligibility::RejectReason;

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::feed::FeedClient;
use crate::fetcher::{CliMediaFetcher, MediaFetcher};
use crate::page::PageClient;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Main acquisition engine (cloneable - all fields are Arc-wrapped)
///
/// One poll cycle processes all configured shows strictly sequentially, and
/// within a show all entries strictly sequentially. There is only ever one
/// writer for the download folder listing and the history store, and it is
/// synchronous with the reader, so no locking discipline is needed beyond
/// "record history only after the downloader reports success".
#[derive(Clone)]
pub struct ShowDownloader {
    /// Database instance for history persistence (shared across tasks)
    /// Public so embedders can inspect acquisition history
    pub db: Arc<Database>,
    /// Configuration (shared across tasks)
    pub(crate) config: Arc<Config>,
    /// Feed retrieval and parsing
    pub(crate) feed_client: Arc<FeedClient>,
    /// Episode page inspection (release checks, thumbnails)
    pub(crate) page_client: Arc<PageClient>,
    /// Media transfer implementation (trait object for pluggable tools)
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    /// Flag indicating whether poll cycles should keep running
    /// (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl ShowDownloader {
    /// Create a new ShowDownloader instance
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Opens/creates the SQLite history database
    /// - Builds the HTTP clients for feeds and episode pages
    /// - Locates the external downloader binary
    ///
    /// # Errors
    /// Returns error if the configuration is invalid, the database cannot
    /// be opened, or no downloader binary can be found.
    pub async fn new(config: Config) -> Result<Self> {
        let fetcher = Arc::new(CliMediaFetcher::from_config(&config.tools)?);
        Self::with_fetcher(config, fetcher).await
    }

    /// Create a ShowDownloader with an explicit media fetcher
    ///
    /// This is the dependency-injection seam: embedders (and tests) can
    /// supply any [`MediaFetcher`] implementation instead of the external
    /// CLI tool.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the database cannot
    /// be opened.
    pub async fn with_fetcher(config: Config, fetcher: Arc<dyn MediaFetcher>) -> Result<Self> {
        config.validate()?;

        let db = Database::new(&config.persistence.database_path).await?;
        let feed_client = FeedClient::new(&config.fetch)?;
        let page_client = PageClient::new(&config.fetch)?;

        info!(
            shows = config.shows.len(),
            fetcher = fetcher.name(),
            "Show downloader initialized"
        );

        Ok(Self {
            db: Arc::new(db),
            config: Arc::new(config),
            feed_client: Arc::new(feed_client),
            page_client: Arc::new(page_client),
            fetcher,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Shut down the downloader
    ///
    /// Stops any running [`PollScheduler`](crate::poll_scheduler::PollScheduler)
    /// at its next tick and closes the history database. Safe to call
    /// between poll cycles; history is persisted per successful download,
    /// so no state is lost.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down");
        self.accepting_new.store(false, Ordering::SeqCst);
        self.db.close().await;
        Ok(())
    }
}
