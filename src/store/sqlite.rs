//! SQLite-backed gallery store.
//!
//! Durable metadata and payloads in one place: image rows carry their data
//! URL directly, shared links store their image snapshot as a JSON column.
//! Migrations are plain SQL applied statement by statement.

use super::{GalleryStore, StoreError, StoreResult};
use crate::models::{image::StoredImage, share::SharedLink};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

const MIGRATION_SQL: &str = include_str!("../../migrations/0001_init.sql");

/// Apply the embedded schema to `pool`, one statement at a time.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    let statements = MIGRATION_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    for stmt in statements {
        tracing::debug!("executing migration statement: {}", stmt);
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<SqlitePool>,
}

impl SqliteStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }
}

/// Database shape of a [`StoredImage`]; categories travel as JSON text.
#[derive(FromRow)]
struct ImageRow {
    id: Uuid,
    owner_token: String,
    name: String,
    size: i64,
    data_url: String,
    created_at: DateTime<Utc>,
    edited_at: Option<DateTime<Utc>>,
    group_id: Option<Uuid>,
    categories: Option<String>,
}

impl ImageRow {
    fn into_model(self) -> StoreResult<StoredImage> {
        let categories = match self.categories {
            Some(json) => serde_json::from_str(&json)
                .map_err(|err| StoreError::Backend(format!("corrupt categories column: {err}")))?,
            None => Vec::new(),
        };
        Ok(StoredImage {
            id: self.id,
            owner_token: self.owner_token,
            name: self.name,
            size: self.size,
            data_url: self.data_url,
            created_at: self.created_at,
            edited_at: self.edited_at,
            group_id: self.group_id,
            categories,
        })
    }
}

/// Database shape of a [`SharedLink`]; the image snapshot is a JSON column.
#[derive(FromRow)]
struct LinkRow {
    id: Uuid,
    images: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_model(self) -> StoreResult<SharedLink> {
        let images = serde_json::from_str(&self.images)
            .map_err(|err| StoreError::Backend(format!("corrupt link snapshot: {err}")))?;
        Ok(SharedLink {
            id: self.id,
            images,
            created_at: self.created_at,
            expires_at: self.expires_at,
        })
    }
}

fn categories_json(image: &StoredImage) -> StoreResult<Option<String>> {
    if image.categories.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(&image.categories)
        .map(Some)
        .map_err(|err| StoreError::Backend(err.to_string()))
}

const IMAGE_COLUMNS: &str =
    "id, owner_token, name, size, data_url, created_at, edited_at, group_id, categories";

#[async_trait]
impl GalleryStore for SqliteStore {
    async fn insert_image(&self, image: &StoredImage) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO images (id, owner_token, name, size, data_url, created_at, edited_at, group_id, categories)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(image.id)
        .bind(&image.owner_token)
        .bind(&image.name)
        .bind(image.size)
        .bind(&image.data_url)
        .bind(image.created_at)
        .bind(image.edited_at)
        .bind(image.group_id)
        .bind(categories_json(image)?)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    async fn get_image(&self, id: Uuid) -> StoreResult<StoredImage> {
        let row = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?"
        ))
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StoreError::ImageNotFound(id),
            other => StoreError::Sqlx(other),
        })?;
        row.into_model()
    }

    async fn list_images(&self, owner_token: &str) -> StoreResult<Vec<StoredImage>> {
        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE owner_token = ? ORDER BY created_at ASC"
        ))
        .bind(owner_token)
        .fetch_all(&*self.db)
        .await?;
        rows.into_iter().map(ImageRow::into_model).collect()
    }

    async fn list_group(&self, group_id: Uuid) -> StoreResult<Vec<StoredImage>> {
        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE group_id = ? ORDER BY name ASC"
        ))
        .bind(group_id)
        .fetch_all(&*self.db)
        .await?;
        rows.into_iter().map(ImageRow::into_model).collect()
    }

    async fn update_image(&self, image: &StoredImage) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE images
             SET name = ?, size = ?, data_url = ?, edited_at = ?, group_id = ?, categories = ?
             WHERE id = ?",
        )
        .bind(&image.name)
        .bind(image.size)
        .bind(&image.data_url)
        .bind(image.edited_at)
        .bind(image.group_id)
        .bind(categories_json(image)?)
        .bind(image.id)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ImageNotFound(image.id));
        }
        Ok(())
    }

    async fn delete_image(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ImageNotFound(id));
        }
        Ok(())
    }

    async fn delete_all_images(&self, owner_token: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM images WHERE owner_token = ?")
            .bind(owner_token)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_link(&self, link: &SharedLink) -> StoreResult<()> {
        let snapshot = serde_json::to_string(&link.images)
            .map_err(|err| StoreError::Backend(err.to_string()))?;
        sqlx::query(
            "INSERT INTO shared_links (id, images, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(link.id)
        .bind(snapshot)
        .bind(link.created_at)
        .bind(link.expires_at)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    async fn get_link(&self, id: Uuid) -> StoreResult<SharedLink> {
        let row = sqlx::query_as::<_, LinkRow>(
            "SELECT id, images, created_at, expires_at FROM shared_links WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StoreError::LinkNotFound(id),
            other => StoreError::Sqlx(other),
        })?;
        row.into_model()
    }

    async fn list_links(&self) -> StoreResult<Vec<SharedLink>> {
        let rows = sqlx::query_as::<_, LinkRow>(
            "SELECT id, images, created_at, expires_at FROM shared_links",
        )
        .fetch_all(&*self.db)
        .await?;
        rows.into_iter().map(LinkRow::into_model).collect()
    }

    async fn delete_link(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM shared_links WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::LinkNotFound(id));
        }
        Ok(())
    }

    async fn health(&self) -> StoreResult<()> {
        let value = sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        if value != 1 {
            return Err(StoreError::Backend(format!(
                "unexpected readiness probe result: {value}"
            )));
        }
        Ok(())
    }
}
