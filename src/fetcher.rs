//! Media transfer via an external downloader binary.
//!
//! The actual media download is delegated to an external tool (yt-dlp or
//! youtube-dl) invoked as a subprocess. The [`MediaFetcher`] trait is the
//! seam that makes the concrete tool swappable and the acquisition
//! pipeline testable with a fake implementation.

use crate::config::ToolsConfig;
use crate::error::{FetcherError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Downloader binaries probed in PATH, in preference order
const KNOWN_BINARIES: &[&str] = &["yt-dlp", "youtube-dl"];

/// Trait for transferring one episode's media to disk
///
/// Implementations receive the episode URL and an output path template in
/// the downloader's `%(ext)s` convention (the tool resolves the actual
/// media extension). Success means the media file landed; any failure
/// leaves the destination folder in whatever state the tool left it and
/// the caller retries on a later poll.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download `url` to the given output path template
    ///
    /// # Errors
    /// Returns an error if the transfer could not be started or did not
    /// complete successfully. Callers treat every error the same way: log,
    /// skip history recording, retry next poll.
    async fn fetch(&self, url: &str, output_template: &str) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// CLI-based media fetcher invoking an external downloader binary
///
/// # Examples
///
/// ```no_run
/// use mediathek_dl::fetcher::{CliMediaFetcher, MediaFetcher};
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let fetcher = CliMediaFetcher::new(PathBuf::from("/usr/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let fetcher = CliMediaFetcher::from_path()
///     .expect("no downloader found in PATH");
///
/// fetcher.fetch("https://example.com/ep/1", "/media/demo/Demo S24E01.%(ext)s").await?;
/// # Ok(())
/// # }
/// ```
pub struct CliMediaFetcher {
    binary_path: PathBuf,
}

impl CliMediaFetcher {
    /// Create a new CLI fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find a known downloader binary in PATH
    ///
    /// Probes `yt-dlp` first, then `youtube-dl`.
    ///
    /// # Returns
    /// `Some(CliMediaFetcher)` if a binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        KNOWN_BINARIES
            .iter()
            .find_map(|binary| which::which(binary).ok())
            .map(Self::new)
    }

    /// Build a fetcher from the tools configuration
    ///
    /// An explicitly configured path wins; otherwise PATH is searched when
    /// `search_path` is enabled.
    ///
    /// # Errors
    /// Returns [`FetcherError::BinaryNotFound`] when no binary can be
    /// located.
    pub fn from_config(tools: &ToolsConfig) -> Result<Self> {
        if let Some(path) = &tools.downloader_path {
            return Ok(Self::new(path.clone()));
        }

        if tools.search_path
            && let Some(fetcher) = Self::from_path()
        {
            return Ok(fetcher);
        }

        Err(FetcherError::BinaryNotFound(KNOWN_BINARIES.join(", ")).into())
    }

    fn tool_name(&self) -> String {
        self.binary_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.binary_path.display().to_string())
    }
}

#[async_trait]
impl MediaFetcher for CliMediaFetcher {
    async fn fetch(&self, url: &str, output_template: &str) -> Result<()> {
        let output = Command::new(&self.binary_path)
            .arg(url)
            .arg("-o")
            .arg(output_template)
            .output()
            .await
            .map_err(|e| FetcherError::LaunchFailed {
                tool: self.tool_name(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            debug!(
                tool = %self.tool_name(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "Downloader reported failure"
            );
            return Err(FetcherError::NonZeroExit {
                tool: self.tool_name(),
                status: output.status.to_string(),
                url: url.to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "cli-downloader"
    }
}
