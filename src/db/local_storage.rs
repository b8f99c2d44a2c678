//! Key-value persistence with a browser-`localStorage` shaped API.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::RevisionInfo;

/// Key-value store where each value is an opaque string (JSON in practice).
///
/// Every write goes through [`LocalStorage::commit`], which also advances the
/// revision counter in the same transaction.
#[derive(Clone)]
pub struct LocalStorage {
    pool: SqlitePool,
}

impl LocalStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read the value stored under `key`.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    /// All keys currently stored, sorted.
    pub async fn keys(&self) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.get("key")).collect())
    }

    pub async fn schema_version(&self) -> Result<i32, AppError> {
        let row = sqlx::query("SELECT schema_version FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("schema_version"))
    }

    pub async fn revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Write `entries` and bump the revision atomically.
    ///
    /// Either every entry is stored and the revision advances by one, or
    /// nothing changes.
    pub async fn commit(&self, entries: &[(&str, String)]) -> Result<RevisionInfo, AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                "INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            )
            .bind(*key)
            .bind(value.as_str())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }
}
