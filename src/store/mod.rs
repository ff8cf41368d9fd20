//! Persistence layer for the gallery.
//!
//! The original system had two divergent backends (a remote table store and
//! a browser local-storage fallback) duplicating the same logic. Here both
//! sit behind one [`GalleryStore`] trait: [`sqlite::SqliteStore`] is the
//! durable backend, [`memory::MemoryStore`] the local fallback. Ownership
//! scoping is always an explicit `owner_token` parameter, never ambient
//! state.

pub mod memory;
pub mod sqlite;

use crate::models::{image::StoredImage, share::SharedLink};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("image `{0}` not found")]
    ImageNotFound(Uuid),
    #[error("shared link `{0}` not found")]
    LinkNotFound(Uuid),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Narrow persistence contract shared by both backends.
///
/// Image records are scoped by owner token; link records are global (the
/// share identifier itself is the secret). `list_links` returns every
/// record, expired included; expiry policy lives in the service layer.
#[async_trait]
pub trait GalleryStore: Send + Sync {
    async fn insert_image(&self, image: &StoredImage) -> StoreResult<()>;
    async fn get_image(&self, id: Uuid) -> StoreResult<StoredImage>;
    async fn list_images(&self, owner_token: &str) -> StoreResult<Vec<StoredImage>>;
    async fn list_group(&self, group_id: Uuid) -> StoreResult<Vec<StoredImage>>;
    async fn update_image(&self, image: &StoredImage) -> StoreResult<()>;
    async fn delete_image(&self, id: Uuid) -> StoreResult<()>;
    /// Remove every image owned by `owner_token`, returning how many went.
    async fn delete_all_images(&self, owner_token: &str) -> StoreResult<u64>;

    async fn insert_link(&self, link: &SharedLink) -> StoreResult<()>;
    async fn get_link(&self, id: Uuid) -> StoreResult<SharedLink>;
    async fn list_links(&self) -> StoreResult<Vec<SharedLink>>;
    async fn delete_link(&self, id: Uuid) -> StoreResult<()>;

    /// Cheap readiness check for the `/readyz` probe.
    async fn health(&self) -> StoreResult<()>;
}
