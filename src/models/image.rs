//! Represents a single image record in a user's gallery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored image: metadata plus its encoded content as a data URL.
///
/// The id is assigned at creation and never changes. `size` always matches
/// the byte length of the content embedded in `data_url`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoredImage {
    /// Unique identifier, immutable after creation.
    pub id: Uuid,

    /// Opaque token scoping this image to its owner.
    pub owner_token: String,

    /// Original filename.
    pub name: String,

    /// Byte length of the encoded content.
    pub size: i64,

    /// Embedded `data:<mime>;base64,` URI carrying the encoded bytes.
    pub data_url: String,

    /// When the image was uploaded.
    pub created_at: DateTime<Utc>,

    /// When the image was last transformed, if ever.
    pub edited_at: Option<DateTime<Utc>>,

    /// Links together the sibling outputs of one column-split operation.
    pub group_id: Option<Uuid>,

    /// Classification labels, in order.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl StoredImage {
    /// Build a fresh record for uploaded bytes already wrapped in a data URL.
    pub fn new(owner_token: &str, name: &str, size: i64, data_url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_token: owner_token.to_string(),
            name: name.to_string(),
            size,
            data_url,
            created_at: Utc::now(),
            edited_at: None,
            group_id: None,
            categories: Vec::new(),
        }
    }

    /// Filename without its final extension, used to name split outputs.
    pub fn name_stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_assigns_distinct_ids() {
        let a = StoredImage::new("me@example.com", "a.png", 3, "data:image/png;base64,AAAA".into());
        let b = StoredImage::new("me@example.com", "a.png", 3, "data:image/png;base64,AAAA".into());
        assert_ne!(a.id, b.id);
        assert!(a.edited_at.is_none());
        assert!(a.group_id.is_none());
    }

    #[test]
    fn name_stem_strips_one_extension() {
        let mut img =
            StoredImage::new("me@example.com", "cat.png", 1, "data:image/png;base64,AA".into());
        assert_eq!(img.name_stem(), "cat");

        img.name = "archive.tar.gz".into();
        assert_eq!(img.name_stem(), "archive.tar");

        img.name = "noext".into();
        assert_eq!(img.name_stem(), "noext");

        img.name = ".hidden".into();
        assert_eq!(img.name_stem(), ".hidden");
    }
}
