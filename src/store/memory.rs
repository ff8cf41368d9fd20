//! In-memory gallery store.
//!
//! Counterpart of the original's browser local-storage fallback: the same
//! semantics as the SQLite backend with no durability. Also the backend the
//! service tests run against.

use super::{GalleryStore, StoreError, StoreResult};
use crate::models::{image::StoredImage, share::SharedLink};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryStore {
    images: Arc<RwLock<HashMap<Uuid, StoredImage>>>,
    links: Arc<RwLock<HashMap<Uuid, SharedLink>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GalleryStore for MemoryStore {
    async fn insert_image(&self, image: &StoredImage) -> StoreResult<()> {
        let mut images = self.images.write().await;
        // Primary-key semantics, matching the SQLite backend.
        if images.contains_key(&image.id) {
            return Err(StoreError::Backend(format!(
                "image `{}` already exists",
                image.id
            )));
        }
        images.insert(image.id, image.clone());
        Ok(())
    }

    async fn get_image(&self, id: Uuid) -> StoreResult<StoredImage> {
        self.images
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::ImageNotFound(id))
    }

    async fn list_images(&self, owner_token: &str) -> StoreResult<Vec<StoredImage>> {
        let images = self.images.read().await;
        let mut owned: Vec<StoredImage> = images
            .values()
            .filter(|image| image.owner_token == owner_token)
            .cloned()
            .collect();
        owned.sort_by_key(|image| image.created_at);
        Ok(owned)
    }

    async fn list_group(&self, group_id: Uuid) -> StoreResult<Vec<StoredImage>> {
        let images = self.images.read().await;
        let mut members: Vec<StoredImage> = images
            .values()
            .filter(|image| image.group_id == Some(group_id))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(members)
    }

    async fn update_image(&self, image: &StoredImage) -> StoreResult<()> {
        let mut images = self.images.write().await;
        match images.get_mut(&image.id) {
            Some(existing) => {
                *existing = image.clone();
                Ok(())
            }
            None => Err(StoreError::ImageNotFound(image.id)),
        }
    }

    async fn delete_image(&self, id: Uuid) -> StoreResult<()> {
        self.images
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::ImageNotFound(id))
    }

    async fn delete_all_images(&self, owner_token: &str) -> StoreResult<u64> {
        let mut images = self.images.write().await;
        let before = images.len();
        images.retain(|_, image| image.owner_token != owner_token);
        Ok((before - images.len()) as u64)
    }

    async fn insert_link(&self, link: &SharedLink) -> StoreResult<()> {
        let mut links = self.links.write().await;
        if links.contains_key(&link.id) {
            return Err(StoreError::Backend(format!(
                "shared link `{}` already exists",
                link.id
            )));
        }
        links.insert(link.id, link.clone());
        Ok(())
    }

    async fn get_link(&self, id: Uuid) -> StoreResult<SharedLink> {
        self.links
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::LinkNotFound(id))
    }

    async fn list_links(&self) -> StoreResult<Vec<SharedLink>> {
        Ok(self.links.read().await.values().cloned().collect())
    }

    async fn delete_link(&self, id: Uuid) -> StoreResult<()> {
        self.links
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::LinkNotFound(id))
    }

    async fn health(&self) -> StoreResult<()> {
        Ok(())
    }
}
