//! # mediathek-dl
//!
//! Unattended feed-polling download agent for tracked shows.
//!
//! mediathek-dl periodically polls syndication feeds for new episodes of
//! tracked shows, decides which entries are new and eligible (deduplication
//! against a durable history, per-show filter rules, release-readiness),
//! and downloads each accepted episode exactly once — together with a
//! sequential filename, a metadata sidecar, and a thumbnail. The media
//! transfer itself is delegated to an external downloader binary (yt-dlp
//! or youtube-dl).
//!
//! ## Design Philosophy
//!
//! - **Idempotent** - Acquired links are recorded durably; repeated polls
//!   and process restarts never re-download
//! - **Filesystem as ground truth** - Episode numbering is derived from
//!   the files already in the download folder, not an internal counter
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Strictly sequential** - One poll cycle, one show, one entry at a
//!   time; there is never more than one writer
//!
//! ## Quick Start
//!
//! ```no_run
//! use mediathek_dl::{Config, DownloadConfig, ShowConfig, ShowDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         shows: vec![ShowConfig {
//!             name: "Demo".to_string(),
//!             feed_url: "https://example.com/feed".to_string(),
//!             download: DownloadConfig {
//!                 folder: "/media/demo".into(),
//!                 filename_prefix: "Demo".to_string(),
//!             },
//!             filter: None,
//!         }],
//!         ..Default::default()
//!     };
//!
//!     let downloader = ShowDownloader::new(config).await?;
//!
//!     // One poll cycle; use PollScheduler for the recurring loop
//!     downloader.check_all_shows().await;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Database persistence layer (download history)
pub mod db;
/// Core acquisition engine (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Feed retrieval and parsing
pub mod feed;
/// Media transfer via an external downloader binary
pub mod fetcher;
/// Sequential episode filename derivation
pub mod filename;
/// Episode page inspection (release checks, thumbnails)
pub mod page;
/// Fixed-interval poll scheduling
pub mod poll_scheduler;

// Re-export commonly used types
pub use config::{
    Config, DownloadConfig, FetchConfig, FilterConfig, PersistenceConfig, RegexField, ShowConfig,
    ToolsConfig,
};
pub use db::{Database, HistoryRecord};
pub use downloader::{RejectReason, ShowDownloader};
pub use error::{DatabaseError, Error, FetcherError, FilenameError, Result};
pub use feed::{FeedClient, FeedEntry};
pub use fetcher::{CliMediaFetcher, MediaFetcher};
pub use filename::EpisodeName;
pub use page::PageClient;
pub use poll_scheduler::PollScheduler;

/// Helper function to run the downloader with graceful signal handling.
///
/// Spawns the poll scheduler, waits for a termination signal, and then
/// calls the downloader's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use mediathek_dl::{Config, ShowDownloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::from_json_file("configuration.json".as_ref())?;
///     let downloader = ShowDownloader::new(config).await?;
///
///     // Poll until terminated
///     run_with_shutdown(downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: ShowDownloader) -> Result<()> {
    let downloader = std::sync::Arc::new(downloader);

    let scheduler = PollScheduler::new(downloader.clone());
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run().await;
    });

    wait_for_signal().await;
    downloader.shutdown().await?;

    // The scheduler notices the shutdown flag within its next tick
    let _ = scheduler_handle.await;

    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
