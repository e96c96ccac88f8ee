//! # Photo Repository
//!
//! File storage for booking photos. Each upload becomes one row holding
//! the decoded bytes; bookings reference photos by id.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use hoffman_core::photo::PhotoData;

/// A stored photo file.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredPhoto {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate usage of the photo store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub file_count: i64,
    pub total_bytes: i64,
}

/// Repository for photo files.
#[derive(Debug, Clone)]
pub struct PhotoRepository {
    pool: SqlitePool,
}

impl PhotoRepository {
    /// Creates a new PhotoRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PhotoRepository { pool }
    }

    /// Stores a decoded photo and returns its id.
    ///
    /// File names follow `photo-<unix-ms>-<random>.<ext>`.
    pub async fn insert(&self, photo: &PhotoData) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let suffix: String = id.chars().filter(|c| *c != '-').take(8).collect();
        let file_name = format!(
            "photo-{}-{}.{}",
            now.timestamp_millis(),
            suffix,
            photo.extension()
        );

        debug!(id = %id, file = %file_name, bytes = photo.bytes.len(), "Storing photo");

        sqlx::query(
            r#"
            INSERT INTO photos (id, file_name, mime_type, size_bytes, data, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&id)
        .bind(&file_name)
        .bind(photo.mime_type())
        .bind(photo.bytes.len() as i64)
        .bind(&photo.bytes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Gets a photo by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<StoredPhoto>> {
        let photo = sqlx::query_as::<_, StoredPhoto>(
            r#"
            SELECT id, file_name, mime_type, size_bytes, data, created_at
            FROM photos
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(photo)
    }

    /// Deletes a photo.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM photos WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Photo", id));
        }
        Ok(())
    }

    /// File count and total size of stored photos.
    pub async fn storage_info(&self) -> DbResult<StorageInfo> {
        let (file_count, total_bytes): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(size_bytes), 0) FROM photos")
                .fetch_one(&self.pool)
                .await?;

        Ok(StorageInfo {
            file_count,
            total_bytes,
        })
    }
}
