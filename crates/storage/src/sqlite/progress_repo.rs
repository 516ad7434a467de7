use chrono::{DateTime, Utc};
use learn_core::model::ProgressDocument;
use sqlx::Row;

use super::SqliteRepository;
use crate::codec;
use crate::repository::{ProgressRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self) -> Result<Option<ProgressDocument>, StorageError> {
        let row = sqlx::query("SELECT document FROM progress_documents WHERE storage_key = ?1")
            .bind(&self.key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            tracing::debug!(key = %self.key, "no stored progress");
            return Ok(None);
        };
        let document: String = row.try_get("document").map_err(conn)?;
        codec::decode(&document).map(Some)
    }

    async fn save_progress(
        &self,
        progress: &ProgressDocument,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let document = codec::encode(progress)?;

        sqlx::query(
            r"
            INSERT INTO progress_documents (storage_key, document, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(storage_key) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            ",
        )
        .bind(&self.key)
        .bind(document)
        .bind(saved_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        tracing::debug!(key = %self.key, "saved progress");
        Ok(())
    }

    async fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let row = sqlx::query("SELECT updated_at FROM progress_documents WHERE storage_key = ?1")
            .bind(&self.key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|row| row.try_get::<DateTime<Utc>, _>("updated_at"))
            .transpose()
            .map_err(conn)
    }
}
