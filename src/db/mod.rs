//! Database layer for mediathek-dl
//!
//! Handles SQLite persistence for the download history — the durable,
//! append-only record of episode links that have already been acquired.
//! The history is what makes repeated polls idempotent: a link that is in
//! the history is never downloaded again, across process restarts.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`history`] — History membership and recording

use sqlx::{FromRow, sqlite::SqlitePool};

mod history;
mod migrations;

/// History record from database
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRecord {
    /// Source link of the downloaded episode (unique identifier)
    pub link: String,
    /// Episode title at the time of download
    pub title: Option<String>,
    /// Unix timestamp when the download was recorded
    pub downloaded_at: i64,
}

/// Database handle for mediathek-dl
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
