//! Metadata sidecar and thumbnail writing.
//!
//! Every accepted episode gets three files sharing one stem: the media
//! file (written by the external downloader), a `.nfo` metadata document,
//! and a `-thumb.jpg` image. The stem is re-derived from the folder
//! listing in each step; since nothing before the media file itself lands
//! changes the set of media files, all steps of one entry agree on it.

use crate::config::DownloadConfig;
use crate::error::{Error, Result};
use crate::feed::FeedEntry;
use crate::filename;
use tracing::debug;

use super::ShowDownloader;

impl ShowDownloader {
    /// Save the episode's thumbnail next to its media file
    ///
    /// Fetches the entry's page, extracts the `og:image` URL, fetches the
    /// image, and writes it to `"{stem}-thumb.jpg"`.
    ///
    /// # Errors
    /// Returns error if the page has no thumbnail, a fetch fails, or the
    /// file cannot be written. The caller degrades gracefully — a missing
    /// thumbnail never blocks the episode's acquisition.
    pub(crate) async fn save_thumbnail(
        &self,
        entry: &FeedEntry,
        download: &DownloadConfig,
    ) -> Result<()> {
        let name = filename::next_name(download, &filename::current_season_token())?;

        let thumb_url = self
            .page_client
            .thumbnail_url(&entry.link)
            .await?
            .ok_or_else(|| Error::Other(format!("no og:image tag on {}", entry.link)))?;

        let bytes = self.page_client.fetch_image(&thumb_url).await?;

        let path = download.folder.join(format!("{}-thumb.jpg", name.stem));
        tokio::fs::write(&path, &bytes).await?;

        debug!(path = %path.display(), "Saved thumbnail");
        Ok(())
    }

    /// Write the episode's `.nfo` metadata sidecar
    ///
    /// The document carries the feed entry's description as plot, its
    /// title, the air date reformatted to `YYYY-MM-DD`, and the season and
    /// episode numbers embedded in the derived filename.
    ///
    /// # Errors
    /// Returns error if the filename cannot be derived or the file cannot
    /// be written.
    pub(crate) async fn write_nfo(
        &self,
        entry: &FeedEntry,
        download: &DownloadConfig,
    ) -> Result<()> {
        let name = filename::next_name(download, &filename::current_season_token())?;

        let aired = entry
            .published
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        let content = render_nfo(&entry.description, &entry.title, &aired, name.season, name.episode);

        let path = download.folder.join(format!("{}.nfo", name.stem));
        tokio::fs::write(&path, content).await?;

        debug!(path = %path.display(), "Wrote metadata sidecar");
        Ok(())
    }
}

/// Render the `episodedetails` metadata document
fn render_nfo(plot: &str, title: &str, aired: &str, season: u32, episode: u32) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"yes\"?>\n\
         <episodedetails>\n  \
         <plot>{}</plot>\n  \
         <title>{}</title>\n  \
         <aired>{}</aired>\n  \
         <season>{}</season>\n  \
         <episode>{}</episode>\n\
         </episodedetails>",
        escape_xml(plot),
        escape_xml(title),
        aired,
        season,
        episode
    )
}

/// Escape the characters that would break the XML document
///
/// Feed descriptions routinely contain ampersands; full entity handling is
/// not needed for the fixed schema.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
