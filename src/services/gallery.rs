//! GalleryService — business rules over the persistence trait.
//!
//! Owns upload validation, the edit and split pipelines, and the shared-link
//! lifecycle. Persistence goes through a [`GalleryStore`], so the same rules
//! apply to the SQLite backend and the in-memory fallback.
//!
//! Expiry policy: `resolve_share` returns the record even when expired and
//! reports expiration as a separate field; `list_shares` hides expired
//! records.

use crate::models::{image::StoredImage, share::SharedLink};
use crate::store::{GalleryStore, StoreError};
use crate::transform::{
    self, CropRegion, JPEG_QUALITY, Raster, TransformError, compose, split_columns,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Hard cap on files per upload batch.
pub const MAX_BATCH_FILES: usize = 20;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("image `{0}` not found")]
    ImageNotFound(Uuid),
    #[error("shared link `{0}` not found")]
    LinkNotFound(Uuid),
    #[error("image group `{0}` not found")]
    GroupNotFound(Uuid),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for GalleryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ImageNotFound(id) => GalleryError::ImageNotFound(id),
            StoreError::LinkNotFound(id) => GalleryError::LinkNotFound(id),
            other => GalleryError::Backend(other.to_string()),
        }
    }
}

pub type GalleryResult<T> = Result<T, GalleryError>;

/// One file of an upload batch.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Bytes,
}

/// A file turned away by per-file validation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RejectedUpload {
    pub name: String,
    pub reason: String,
}

/// Outcome of an upload batch.
///
/// Batches stop at the first invalid file: `saved` holds everything stored
/// before the failure, `rejected` the failure itself, and any later files
/// are never attempted. This is stop-on-first-error, not atomicity.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub saved: Vec<StoredImage>,
    pub rejected: Option<RejectedUpload>,
}

/// A resolved share: the record plus its expiration status and public URL.
#[derive(Debug, Serialize)]
pub struct ShareView {
    #[serde(flatten)]
    pub link: SharedLink,
    pub expired: bool,
    pub url: String,
}

#[derive(Clone)]
pub struct GalleryService {
    store: Arc<dyn GalleryStore>,
    public_base_url: String,
    max_upload_bytes: usize,
}

impl GalleryService {
    pub fn new(
        store: Arc<dyn GalleryStore>,
        public_base_url: impl Into<String>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into(),
            max_upload_bytes,
        }
    }

    pub fn store(&self) -> &Arc<dyn GalleryStore> {
        &self.store
    }

    /// Store an upload batch for `owner_token`, stopping at the first
    /// invalid file.
    pub async fn upload(
        &self,
        owner_token: &str,
        files: Vec<UploadFile>,
    ) -> GalleryResult<UploadReport> {
        if owner_token.is_empty() {
            return Err(GalleryError::Validation("owner token is required".into()));
        }
        if files.is_empty() {
            return Err(GalleryError::Validation("no files provided".into()));
        }
        if files.len() > MAX_BATCH_FILES {
            return Err(GalleryError::Validation(format!(
                "too many files in one batch: {} (limit {MAX_BATCH_FILES})",
                files.len()
            )));
        }

        let existing = self.store.list_images(owner_token).await?;
        let mut saved: Vec<StoredImage> = Vec::new();

        for file in files {
            if let Err(reason) = self.validate_file(&file, &existing, &saved) {
                info!(name = %file.name, %reason, "rejecting upload");
                return Ok(UploadReport {
                    saved,
                    rejected: Some(RejectedUpload {
                        name: file.name,
                        reason,
                    }),
                });
            }

            let format = image::guess_format(&file.bytes)
                .map_err(|err| TransformError::Decode(err.to_string()))?;
            let data_url = transform::encode_data_url(format.to_mime_type(), &file.bytes);
            let image = StoredImage::new(owner_token, &file.name, file.bytes.len() as i64, data_url);
            self.store.insert_image(&image).await?;
            info!(id = %image.id, name = %image.name, size = image.size, "stored image");
            saved.push(image);
        }

        Ok(UploadReport {
            saved,
            rejected: None,
        })
    }

    /// Per-file validation: emptiness, size cap, recognizable raster format,
    /// duplicate name+size against the gallery and the batch so far.
    fn validate_file(
        &self,
        file: &UploadFile,
        existing: &[StoredImage],
        saved: &[StoredImage],
    ) -> Result<(), String> {
        if file.name.is_empty() {
            return Err("file has no name".into());
        }
        if file.bytes.is_empty() {
            return Err(format!("{} is empty", file.name));
        }
        if file.bytes.len() > self.max_upload_bytes {
            return Err(format!(
                "{} is too large: {} bytes (limit {})",
                file.name,
                file.bytes.len(),
                self.max_upload_bytes
            ));
        }
        if image::guess_format(&file.bytes).is_err() {
            return Err(format!("{} is not a recognizable image", file.name));
        }
        let size = file.bytes.len() as i64;
        let duplicate = existing
            .iter()
            .chain(saved.iter())
            .any(|image| image.name == file.name && image.size == size);
        if duplicate {
            return Err(format!("{} already exists in your gallery", file.name));
        }
        Ok(())
    }

    pub async fn list_images(&self, owner_token: &str) -> GalleryResult<Vec<StoredImage>> {
        Ok(self.store.list_images(owner_token).await?)
    }

    pub async fn get_image(&self, id: Uuid) -> GalleryResult<StoredImage> {
        Ok(self.store.get_image(id).await?)
    }

    /// Crop/rotate an image in place: the record keeps its identity, its
    /// content is replaced and `edited_at` stamped.
    pub async fn edit_image(
        &self,
        id: Uuid,
        region: CropRegion,
        rotation_degrees: f64,
    ) -> GalleryResult<StoredImage> {
        let mut image = self.store.get_image(id).await?;
        let source = decode_record(&image)?;
        let output = compose(&source, region, rotation_degrees)?;
        let jpeg = transform::encode_jpeg(&output, JPEG_QUALITY)?;

        image.size = jpeg.len() as i64;
        image.data_url = transform::encode_data_url("image/jpeg", &jpeg);
        image.edited_at = Some(Utc::now());
        self.store.update_image(&image).await?;
        info!(id = %image.id, width = output.width, height = output.height, "edited image");
        Ok(image)
    }

    /// Split an image into `columns` new sibling records sharing a fresh
    /// group id. The source record is not mutated.
    pub async fn split_image(&self, id: Uuid, columns: u32) -> GalleryResult<Vec<StoredImage>> {
        if columns == 0 {
            return Err(GalleryError::Validation(
                "column count must be at least 1".into(),
            ));
        }

        let source = self.store.get_image(id).await?;
        let raster = decode_record(&source)?;
        let slices = split_columns(&raster, columns)?;

        let group_id = Uuid::new_v4();
        let mut parts = Vec::with_capacity(slices.len());
        // Pad the index so lexicographic name order stays left-to-right
        // ("x-10.jpg" must not sort between "x-1.jpg" and "x-2.jpg").
        let digits = slices.len().to_string().len();
        for (index, slice) in slices.iter().enumerate() {
            let jpeg = transform::encode_jpeg(slice, JPEG_QUALITY)?;
            let name = format!(
                "{}-{:0width$}.jpg",
                source.name_stem(),
                index + 1,
                width = digits
            );
            let mut part = StoredImage::new(
                &source.owner_token,
                &name,
                jpeg.len() as i64,
                transform::encode_data_url("image/jpeg", &jpeg),
            );
            part.group_id = Some(group_id);
            self.store.insert_image(&part).await?;
            parts.push(part);
        }

        info!(source = %source.id, %group_id, columns, "split image into columns");
        Ok(parts)
    }

    pub async fn delete_image(&self, id: Uuid) -> GalleryResult<()> {
        self.store.delete_image(id).await?;
        Ok(())
    }

    pub async fn clear_images(&self, owner_token: &str) -> GalleryResult<u64> {
        let deleted = self.store.delete_all_images(owner_token).await?;
        info!(owner = %owner_token, deleted, "cleared gallery");
        Ok(deleted)
    }

    /// The sibling records of one split operation.
    pub async fn group_images(&self, group_id: Uuid) -> GalleryResult<Vec<StoredImage>> {
        let members = self.store.list_group(group_id).await?;
        if members.is_empty() {
            return Err(GalleryError::GroupNotFound(group_id));
        }
        Ok(members)
    }

    /// Snapshot the given images into a new 7-day share link.
    pub async fn create_share(&self, image_ids: &[Uuid]) -> GalleryResult<ShareView> {
        if image_ids.is_empty() {
            return Err(GalleryError::Validation(
                "a share needs at least one image".into(),
            ));
        }

        let mut snapshot = Vec::with_capacity(image_ids.len());
        for &id in image_ids {
            snapshot.push(self.store.get_image(id).await?);
        }

        let link = SharedLink::new(snapshot);
        self.store.insert_link(&link).await?;
        info!(id = %link.id, images = link.images.len(), "created share link");

        let url = link.share_url(&self.public_base_url);
        Ok(ShareView {
            link,
            expired: false,
            url,
        })
    }

    /// Resolve a share by id. Expired links still resolve; `expired` tells
    /// the caller to render them as such.
    pub async fn resolve_share(&self, id: Uuid) -> GalleryResult<ShareView> {
        let link = self.store.get_link(id).await?;
        let expired = link.is_expired_at(Utc::now());
        let url = link.share_url(&self.public_base_url);
        Ok(ShareView {
            link,
            expired,
            url,
        })
    }

    /// All non-expired share links, order unspecified.
    pub async fn list_shares(&self) -> GalleryResult<Vec<SharedLink>> {
        let now = Utc::now();
        let links = self.store.list_links().await?;
        Ok(links
            .into_iter()
            .filter(|link| !link.is_expired_at(now))
            .collect())
    }

    pub async fn delete_share(&self, id: Uuid) -> GalleryResult<()> {
        self.store.delete_link(id).await?;
        Ok(())
    }
}

/// Decode a record's data URL back into a raster.
fn decode_record(image: &StoredImage) -> GalleryResult<Raster> {
    let (_mime, bytes) = transform::decode_data_url(&image.data_url)?;
    Ok(transform::decode_image(&bytes)?)
}
