//! Per-show and per-cycle acquisition orchestration.
//!
//! One poll cycle walks every configured show; one show walks its feed
//! entries oldest-published-first so the filename sequencer assigns
//! ascending episode numbers in publication order. Error containment is
//! layered: an entry's transient failure skips that entry, a show's
//! failure skips that show, and nothing propagates out of a cycle.

use crate::config::ShowConfig;
use crate::error::{Error, Result};
use crate::feed::FeedEntry;
use crate::filename;
use tracing::{debug, error, info, warn};

use super::ShowDownloader;

impl ShowDownloader {
    /// Check all configured shows for new downloads
    ///
    /// Shows are processed in configuration order. A failure in one show's
    /// processing is logged and does not abort the remaining shows, and no
    /// error escapes this method — the scheduling loop must keep running.
    pub async fn check_all_shows(&self) {
        info!("Checking all shows");

        for show in &self.config.shows {
            if let Err(e) = self.check_show(show).await {
                error!(show = %show.name, error = %e, "Failed to check show");
            }
        }

        info!("Finished checking all shows");
    }

    /// Check all episodes of one show for new downloads
    ///
    /// Fetches the show's feed, reverses it into chronological
    /// (oldest-first) order, and runs every entry through eligibility and
    /// acquisition. Transient per-entry failures are logged and skipped;
    /// the entry stays out of history and is retried on the next poll.
    ///
    /// # Errors
    /// Returns error when the whole show cannot be processed: the download
    /// folder is missing, the feed cannot be fetched or parsed, existing
    /// filenames on disk are malformed, or the history store is unwritable.
    pub async fn check_show(&self, show: &ShowConfig) -> Result<()> {
        if !show.download.folder.is_dir() {
            return Err(Error::Config {
                message: format!(
                    "download folder {} for show \"{}\" does not exist",
                    show.download.folder.display(),
                    show.name
                ),
                key: None,
            });
        }

        let mut entries = self.feed_client.fetch_entries(&show.feed_url).await?;

        // Feeds list newest-first; sequential numbering needs oldest-first
        entries.reverse();

        debug!(show = %show.name, entries = entries.len(), "Processing feed entries");

        for entry in &entries {
            match self.evaluate(entry, show).await {
                Ok(None) => {
                    info!(
                        show = %show.name,
                        title = %entry.title,
                        link = %entry.link,
                        "Downloading episode"
                    );
                    self.acquire(entry, show).await?;
                }
                Ok(Some(reason)) => {
                    debug!(show = %show.name, title = %entry.title, ?reason, "Skipping entry");
                }
                Err(e) => {
                    // Transient evaluation failure (e.g. release check
                    // timeout): skip this entry, retry next poll
                    warn!(
                        show = %show.name,
                        title = %entry.title,
                        error = %e,
                        "Failed to evaluate entry, will retry next poll"
                    );
                }
            }
        }

        Ok(())
    }

    /// Acquire one eligible entry: thumbnail, metadata sidecar, media
    ///
    /// The thumbnail and metadata writes are best-effort and never block
    /// the media download attempt. Filename derivation errors are the
    /// exception: they indicate folder-state corruption that would affect
    /// every artifact, so they abort the show loudly instead of being
    /// degraded away.
    ///
    /// # Errors
    /// Returns error on filename-state corruption or when recording a
    /// completed download in history fails.
    async fn acquire(&self, entry: &FeedEntry, show: &ShowConfig) -> Result<()> {
        match self.save_thumbnail(entry, &show.download).await {
            Err(e @ Error::Filename(_)) => return Err(e),
            Err(e) => {
                warn!(title = %entry.title, error = %e, "Failed to save thumbnail");
            }
            Ok(()) => {}
        }

        match self.write_nfo(entry, &show.download).await {
            Err(e @ Error::Filename(_)) => return Err(e),
            Err(e) => {
                warn!(title = %entry.title, error = %e, "Failed to write metadata sidecar");
            }
            Ok(()) => {}
        }

        self.download_episode(entry, show).await
    }

    /// Invoke the external downloader for one entry and record success
    ///
    /// The output path is templated as `"{folder}/{stem}.%(ext)s"` — the
    /// downloader resolves the actual media extension. On success the link
    /// is recorded in history before returning; on failure the link stays
    /// unrecorded so the next poll retries it.
    async fn download_episode(&self, entry: &FeedEntry, show: &ShowConfig) -> Result<()> {
        let name = filename::next_name(&show.download, &filename::current_season_token())?;
        let output_template = show
            .download
            .folder
            .join(format!("{}.%(ext)s", name.stem))
            .display()
            .to_string();

        match self.fetcher.fetch(&entry.link, &output_template).await {
            Ok(()) => {
                self.db
                    .add_to_history(&entry.link, Some(&entry.title))
                    .await?;
                info!(
                    title = %entry.title,
                    stem = %name.stem,
                    "Episode downloaded and recorded"
                );
                Ok(())
            }
            Err(e) => {
                error!(link = %entry.link, error = %e, "Error downloading episode");
                Ok(())
            }
        }
    }
}
