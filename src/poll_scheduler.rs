//! Fixed-interval poll scheduling.
//!
//! This module provides the background loop that triggers poll cycles. The
//! first cycle runs immediately on start; afterwards cycles run whenever
//! the configured interval has elapsed. Between cycles the loop wakes once
//! a second so a shutdown request takes effect promptly instead of waiting
//! out the interval.
//!
//! # Example
//!
//! ```no_run
//! use mediathek_dl::{Config, ShowDownloader};
//! use mediathek_dl::poll_scheduler::PollScheduler;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_json_file("configuration.json".as_ref())?;
//! let downloader = Arc::new(ShowDownloader::new(config).await?);
//!
//! let scheduler = PollScheduler::new(downloader.clone());
//!
//! // Run scheduler (blocks until shutdown)
//! tokio::spawn(async move {
//!     scheduler.run().await;
//! });
//! # Ok(())
//! # }
//! ```

use crate::ShowDownloader;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::time::{Duration, Instant, sleep};
use tracing::{debug, info};

/// Poll scheduler that periodically checks all configured shows
pub struct PollScheduler {
    /// Reference to the downloader for running cycles and checking shutdown
    downloader: Arc<ShowDownloader>,
}

impl PollScheduler {
    /// Creates a new poll scheduler
    pub fn new(downloader: Arc<ShowDownloader>) -> Self {
        Self { downloader }
    }

    /// Starts the poll scheduler
    ///
    /// This runs in a loop triggering
    /// [`check_all_shows`](ShowDownloader::check_all_shows) on the
    /// configured interval. The loop will:
    /// 1. Check if shutdown was requested (via the downloader's
    ///    accepting_new flag)
    /// 2. Run a poll cycle if the interval has elapsed (or none has run yet)
    /// 3. Sleep briefly before the next check
    ///
    /// The task respects the shutdown signal and exits gracefully; because
    /// history is persisted per successful download, stopping between
    /// cycles loses no state.
    pub async fn run(self) {
        info!(
            interval_mins = self.downloader.config.check_interval_mins,
            "Poll scheduler started"
        );

        let interval = Duration::from_secs(self.downloader.config.check_interval_mins * 60);
        let mut last_cycle: Option<Instant> = None;

        loop {
            // Check for shutdown signal via the downloader's accepting_new flag
            if !self.downloader.accepting_new.load(Ordering::SeqCst) {
                info!("Poll scheduler shutting down");
                break;
            }

            let due = match last_cycle {
                None => true,
                Some(started) => started.elapsed() >= interval,
            };

            if due {
                let started = Instant::now();
                self.downloader.check_all_shows().await;
                last_cycle = Some(started);
                debug!(elapsed = ?started.elapsed(), "Poll cycle finished");
            }

            // Sleep before re-checking
            // This prevents tight loops while remaining responsive to shutdown
            sleep(Duration::from_secs(1)).await;
        }

        info!("Poll scheduler stopped");
    }
}
