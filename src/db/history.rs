//! History membership and recording.

use crate::error::DatabaseError;
use crate::{Error, Result};

use super::{Database, HistoryRecord};

impl Database {
    /// Check if an episode link has already been downloaded
    ///
    /// The link column is the primary key, so membership is an indexed
    /// lookup rather than a scan.
    pub async fn is_in_history(&self, link: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM history WHERE link = ?
            "#,
        )
        .bind(link)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to check history for link: {}",
                e
            )))
        })?;

        Ok(count > 0)
    }

    /// Record an episode link as downloaded
    ///
    /// Idempotent: re-recording a known link leaves the original record in
    /// place. The insert is committed before this returns, so a crash after
    /// this call never causes a duplicate download attempt. A failure here
    /// must surface to the caller — silently losing the record would cause
    /// unbounded re-downloads.
    pub async fn add_to_history(&self, link: &str, title: Option<&str>) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO history (link, title, downloaded_at)
            VALUES (?, ?, ?)
            ON CONFLICT(link) DO NOTHING
            "#,
        )
        .bind(link)
        .bind(title)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to add link to history: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Count history entries
    pub async fn history_len(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM history")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count history: {}",
                    e
                )))
            })?;

        Ok(count)
    }

    /// Most recently recorded history entries, newest first
    pub async fn recent_history(&self, limit: usize) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT link, title, downloaded_at
            FROM history
            ORDER BY downloaded_at DESC, link DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to query recent history: {}",
                e
            )))
        })?;

        Ok(rows)
    }
}
