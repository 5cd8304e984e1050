//! Shared helpers for downloader tests.

use crate::config::{Config, DownloadConfig, ShowConfig};
use crate::error::{Error, FetcherError, Result};
use crate::fetcher::MediaFetcher;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use super::ShowDownloader;

/// Fake media fetcher that records invocations and simulates the external
/// tool by materializing an `.mp4` file at the templated output path.
pub(crate) struct RecordingFetcher {
    calls: Mutex<Vec<(String, String)>>,
    fail_urls: Mutex<HashSet<String>>,
}

impl RecordingFetcher {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_urls: Mutex::new(HashSet::new()),
        })
    }

    /// Make subsequent fetches of `url` fail with a non-zero exit
    pub(crate) fn fail_for(&self, url: &str) {
        self.fail_urls.lock().unwrap().insert(url.to_string());
    }

    /// Clear a previously configured failure for `url`
    pub(crate) fn succeed_for(&self, url: &str) {
        self.fail_urls.lock().unwrap().remove(url);
    }

    /// All `(url, output_template)` pairs fetched so far
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str, output_template: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), output_template.to_string()));

        if self.fail_urls.lock().unwrap().contains(url) {
            return Err(FetcherError::NonZeroExit {
                tool: "fake-downloader".into(),
                status: "exit status: 1".into(),
                url: url.to_string(),
            }
            .into());
        }

        let media_path = output_template.replace("%(ext)s", "mp4");
        std::fs::write(&media_path, b"media").map_err(Error::from)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording-fake"
    }
}

/// Show config pointing at `folder` with the "Demo" prefix
pub(crate) fn demo_show(folder: &Path, feed_url: &str) -> ShowConfig {
    ShowConfig {
        name: "Demo".into(),
        feed_url: feed_url.to_string(),
        download: DownloadConfig {
            folder: folder.to_path_buf(),
            filename_prefix: "Demo".into(),
        },
        filter: None,
    }
}

/// Build a downloader over a temp database with a [`RecordingFetcher`]
///
/// `release_marker` controls release-readiness checking: pass `None` for
/// tests that should run without any HTTP traffic.
pub(crate) async fn create_test_downloader(
    shows: Vec<ShowConfig>,
    release_marker: Option<String>,
) -> (ShowDownloader, Arc<RecordingFetcher>, TempDir) {
    let state_dir = TempDir::new().expect("Failed to create temp dir");

    let mut config = Config::default();
    config.shows = shows;
    config.fetch.release_marker = release_marker;
    config.persistence.database_path = state_dir.path().join("history.db");

    let fetcher = RecordingFetcher::new();
    let downloader = ShowDownloader::with_fetcher(config, fetcher.clone())
        .await
        .expect("Failed to create downloader");

    (downloader, fetcher, state_dir)
}

/// Render a minimal RSS 2.0 document from `(title, link, pub_date)` items
pub(crate) fn render_rss(items: &[(&str, &str, &str)]) -> String {
    let mut body = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\">\n<channel>\n<title>Demo Show</title>\n",
    );
    for (title, link, pub_date) in items {
        body.push_str(&format!(
            "<item><title>{title}</title><link>{link}</link><pubDate>{pub_date}</pubDate><description>About {title}</description></item>\n"
        ));
    }
    body.push_str("</channel>\n</rss>");
    body
}
