//! Error types for mediathek-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Database, Filename, Fetcher, etc.)
//! - Context information (file path, feed URL, tool name)
//!
//! The taxonomy mirrors how errors are handled by the acquisition pipeline:
//! transient errors (network, downloader exit) are contained at the entry
//! level and retried on the next poll; data/format errors (unparseable
//! filenames on disk) fail loudly; persistence errors are fatal to the
//! recording operation and always surface.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mediathek-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mediathek-dl
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "feed_url")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Feed could not be fetched or parsed
    #[error("feed error: {0}")]
    Feed(String),

    /// Filename sequencing error (existing files on disk are malformed)
    #[error("filename error: {0}")]
    Filename(#[from] FilenameError),

    /// External downloader error
    #[error("downloader error: {0}")]
    Fetcher(#[from] FetcherError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Filename sequencing errors
///
/// These indicate state corruption in a show's download folder: the files
/// on disk no longer match the `"{prefix} S{yy}E{nn}"` scheme the sequencer
/// relies on. The sequencer refuses to guess rather than risk a collision.
#[derive(Debug, Error)]
pub enum FilenameError {
    /// An existing file matching the show's prefix does not follow the
    /// expected `"{prefix} S{yy}E{nn}"` naming pattern
    #[error("existing file {filename:?} in {folder} does not match the episode naming pattern")]
    Unparseable {
        /// The offending filename (without its extension)
        filename: String,
        /// The download folder that was scanned
        folder: PathBuf,
    },

    /// The next episode number would exceed two digits
    ///
    /// Lexicographic ordering of filenames only matches numeric ordering
    /// while episode numbers stay within two digits per season, so the
    /// sequencer rejects the 100th episode instead of wrapping.
    #[error("season {season} in {folder} already has 99 episodes")]
    EpisodeOverflow {
        /// The two-digit season token
        season: String,
        /// The download folder that was scanned
        folder: PathBuf,
    },
}

/// External downloader errors
#[derive(Debug, Error)]
pub enum FetcherError {
    /// No downloader binary was configured or found in PATH
    #[error("downloader binary not found: {0}")]
    BinaryNotFound(String),

    /// The downloader process could not be launched
    #[error("failed to launch {tool}: {reason}")]
    LaunchFailed {
        /// The binary that failed to launch
        tool: String,
        /// The underlying reason
        reason: String,
    },

    /// The downloader exited with a non-zero status
    ///
    /// Any non-zero exit is treated as failure with no partial-success
    /// interpretation; the entry stays out of history and is retried on
    /// the next poll.
    #[error("{tool} exited with {status} for {url}")]
    NonZeroExit {
        /// The binary that was invoked
        tool: String,
        /// The exit status as reported by the OS
        status: String,
        /// The URL that was being downloaded
        url: String,
    },
}
