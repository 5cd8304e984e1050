//! Per-entry eligibility decisions.
//!
//! An entry is downloaded exactly when it is new (not in history), matches
//! the show's filter rules, and is confirmed released. Checks run in that
//! order and short-circuit on the first failure, so the cheap indexed
//! history lookup always runs before any regex work and the release check
//! (an HTTP fetch) only runs for entries that survived everything else.

use crate::config::{RegexField, ShowConfig};
use crate::error::{Error, Result};
use crate::feed::FeedEntry;
use tracing::debug;

use super::ShowDownloader;

/// Why an entry was skipped
///
/// All rejections are non-fatal: the entry is simply skipped for this poll
/// and re-evaluated on the next one, where a changed condition (most
/// commonly release-readiness flipping to true) can admit it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// The link was already downloaded in an earlier poll
    InHistory,
    /// The filter regex did not match the configured field
    RegexMismatch,
    /// The entry was published before the filter's minimum date
    BeforeMinDate,
    /// The entry's page does not carry the release marker yet
    NotReleased,
}

impl ShowDownloader {
    /// Check if an episode should be downloaded
    ///
    /// # Errors
    /// Returns error if the history lookup or the release-readiness fetch
    /// fails; the caller treats that as a transient per-entry failure.
    pub async fn should_download(&self, entry: &FeedEntry, show: &ShowConfig) -> Result<bool> {
        Ok(self.evaluate(entry, show).await?.is_none())
    }

    /// Evaluate an entry against dedup, filter rules, and release-readiness
    ///
    /// Returns `Ok(None)` for an eligible entry, `Ok(Some(reason))` for a
    /// skip. Checks short-circuit: a rejected entry never reaches the
    /// later, more expensive checks.
    pub(crate) async fn evaluate(
        &self,
        entry: &FeedEntry,
        show: &ShowConfig,
    ) -> Result<Option<RejectReason>> {
        // Check if the episode was already downloaded
        if self.db.is_in_history(&entry.link).await? {
            debug!(title = %entry.title, "Episode is in history");
            return Ok(Some(RejectReason::InHistory));
        }

        if let Some(filter) = &show.filter {
            // Check the configured episode field against the regex filter
            if let Some(pattern) = &filter.regex {
                let field_text = match filter.regex_field {
                    RegexField::Title => &entry.title,
                    RegexField::Description => &entry.description,
                    RegexField::Link => &entry.link,
                };

                // Size limit guards against pathological patterns from config
                let regex = regex::RegexBuilder::new(pattern)
                    .size_limit(1024 * 1024)
                    .build()
                    .map_err(|e| Error::Config {
                        message: format!("invalid filter regex \"{}\": {}", pattern, e),
                        key: None,
                    })?;

                if !regex.is_match(field_text) {
                    debug!(title = %entry.title, "Episode does not fit regex");
                    return Ok(Some(RejectReason::RegexMismatch));
                }
            }

            // Check if the episode predates the minimum date. An entry with
            // no parseable publication date cannot be shown to satisfy the
            // bound, so it is skipped as well.
            if let Some(min_date) = filter.min_date {
                match entry.published {
                    Some(published) if published >= min_date => {}
                    _ => {
                        debug!(title = %entry.title, "Episode is before min date");
                        return Ok(Some(RejectReason::BeforeMinDate));
                    }
                }
            }
        }

        // Release-readiness: feeds list future episodes ahead of their
        // publication, so only accept entries whose page already carries
        // the availability marker. Applies to every entry when a marker is
        // configured, filtered show or not.
        if let Some(marker) = &self.config.fetch.release_marker {
            if !self.page_client.contains_marker(&entry.link, marker).await? {
                debug!(title = %entry.title, "Episode is not yet released");
                return Ok(Some(RejectReason::NotReleased));
            }
        }

        Ok(None)
    }
}
