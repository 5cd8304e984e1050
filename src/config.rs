//! Configuration types for mediathek-dl

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for [`ShowDownloader`](crate::ShowDownloader)
///
/// Fields are organized into logical sub-configs:
/// - [`shows`](ShowConfig) — the tracked shows (at least one required)
/// - [`fetch`](FetchConfig) — HTTP behavior and release-readiness checking
/// - [`tools`](ToolsConfig) — the external downloader binary
/// - [`persistence`](PersistenceConfig) — history database location
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Tracked show configurations (at least one required)
    pub shows: Vec<ShowConfig>,

    /// Minutes between poll cycles (default: 30)
    #[serde(default = "default_check_interval_mins")]
    pub check_interval_mins: u64,

    /// HTTP fetch settings (timeouts, user agent, release marker)
    #[serde(default)]
    pub fetch: FetchConfig,

    /// External downloader binary settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Data storage and state management
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shows: Vec::new(),
            check_interval_mins: default_check_interval_mins(),
            fetch: FetchConfig::default(),
            tools: ToolsConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or does not deserialize
    /// into a [`Config`].
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks that every show has a parseable feed URL, a non-empty
    /// filename prefix, and (when set) a compilable filter regex. Download
    /// folder existence is checked per show at poll time instead, so a
    /// missing folder degrades that show's cycle rather than startup.
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the offending key for the first
    /// invalid setting found.
    pub fn validate(&self) -> Result<()> {
        for (index, show) in self.shows.iter().enumerate() {
            if url::Url::parse(&show.feed_url).is_err() {
                return Err(Error::Config {
                    message: format!("\"{}\" is not a valid feed URL", show.feed_url),
                    key: Some(format!("shows[{}].feed_url", index)),
                });
            }

            if show.download.filename_prefix.trim().is_empty() {
                return Err(Error::Config {
                    message: format!("show \"{}\" has an empty filename prefix", show.name),
                    key: Some(format!("shows[{}].download.filename_prefix", index)),
                });
            }

            if let Some(filter) = &show.filter
                && let Some(pattern) = &filter.regex
                && let Err(e) = regex::Regex::new(pattern)
            {
                return Err(Error::Config {
                    message: format!("invalid filter regex \"{}\": {}", pattern, e),
                    key: Some(format!("shows[{}].filter.regex", index)),
                });
            }
        }

        Ok(())
    }
}

/// Configuration for one tracked show
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShowConfig {
    /// Display name for logging
    pub name: String,

    /// Feed URL — source of truth for available episodes
    pub feed_url: String,

    /// Where and under what name episodes are stored
    pub download: DownloadConfig,

    /// Optional filtering rules; entries from shows without a filter are
    /// accepted as long as they are new and release-ready
    #[serde(default)]
    pub filter: Option<FilterConfig>,
}

/// Download destination for a show
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Download folder — must exist before acquisition begins
    pub folder: PathBuf,

    /// Filename prefix for this show's episodes
    ///
    /// Episodes are stored as `"{prefix} S{yy}E{nn}.{ext}"` alongside their
    /// `.nfo` and `-thumb.jpg` sidecars.
    pub filename_prefix: String,
}

/// Filtering rules for a show's feed entries
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Regex that the configured field must match for an entry to qualify
    #[serde(default)]
    pub regex: Option<String>,

    /// Which entry field the regex is applied to (default: title)
    #[serde(default)]
    pub regex_field: RegexField,

    /// Entries published before this date are skipped
    #[serde(default)]
    pub min_date: Option<DateTime<Utc>>,
}

/// Feed entry field a filter regex is matched against
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegexField {
    /// The entry title
    #[default]
    Title,
    /// The entry description
    Description,
    /// The entry link
    Link,
}

/// HTTP fetch behavior (feed retrieval, release checks, thumbnails)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// HTTP request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Marker substring an entry's page must contain for the episode to
    /// count as released (default: the broadcaster's "verfügbar bis"
    /// availability note)
    ///
    /// Feeds routinely list episodes ahead of their publication; the page
    /// only carries this marker once the media is actually available. Set
    /// to `null` to skip release checking entirely.
    #[serde(default = "default_release_marker")]
    pub release_marker: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            release_marker: default_release_marker(),
        }
    }
}

/// External downloader binary configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the downloader executable (auto-detected if None)
    #[serde(default)]
    pub downloader_path: Option<PathBuf>,

    /// Whether to search PATH for the downloader if no explicit path is set
    /// (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            downloader_path: None,
            search_path: true,
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path to the SQLite history database (default: "./mediathek-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_check_interval_mins() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "mediathek-dl feed reader".to_string()
}

fn default_release_marker() -> Option<String> {
    Some("verfügbar bis".to_string())
}

fn default_true() -> bool {
    true
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./mediathek-dl.db")
}
