//! Represents a time-limited shareable link to a set of images.

use crate::models::image::StoredImage;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a share link stays valid after creation.
pub const SHARE_TTL_DAYS: i64 = 7;

/// A shared link: a random public identifier plus a snapshot of the images
/// it exposes.
///
/// The snapshot is captured at creation time. Editing or deleting the
/// original images afterwards does not change what the link serves.
/// Expiration is always exactly [`SHARE_TTL_DAYS`] after creation; a link is
/// valid if and only if the current time is before `expires_at`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SharedLink {
    /// Random identifier used as the public share-path segment.
    pub id: Uuid,

    /// The images captured when the link was created.
    pub images: Vec<StoredImage>,

    pub created_at: DateTime<Utc>,

    /// Always `created_at + SHARE_TTL_DAYS`.
    pub expires_at: DateTime<Utc>,
}

impl SharedLink {
    /// Snapshot `images` into a fresh link expiring in [`SHARE_TTL_DAYS`].
    pub fn new(images: Vec<StoredImage>) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            images,
            created_at,
            expires_at: created_at + Duration::days(SHARE_TTL_DAYS),
        }
    }

    /// Whether the link has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The caller-facing share URL under `origin`.
    pub fn share_url(&self, origin: &str) -> String {
        format!("{}/share/{}", origin.trim_end_matches('/'), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn expiration_is_exactly_seven_days_after_creation() {
        let link = SharedLink::new(Vec::new());
        assert_eq!(link.expires_at - link.created_at, Duration::days(7));
    }

    #[test]
    fn expiry_law_around_the_boundary() {
        let link = SharedLink::new(Vec::new());
        let boundary = link.expires_at;

        assert!(!link.is_expired_at(boundary - Duration::seconds(1)));
        assert!(link.is_expired_at(boundary + Duration::seconds(1)));
        // valid iff now < expires_at, so the boundary itself is expired
        assert!(link.is_expired_at(boundary));
    }

    #[test]
    fn share_url_appends_id_under_origin() {
        let link = SharedLink::new(Vec::new());
        let url = link.share_url("https://pics.example.com/");
        assert_eq!(url, format!("https://pics.example.com/share/{}", link.id));
    }

    #[test]
    fn ten_thousand_links_have_distinct_ids() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(SharedLink::new(Vec::new()).id));
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn snapshot_is_detached_from_its_source_list() {
        let image = StoredImage::new(
            "me@example.com",
            "cat.png",
            4,
            "data:image/png;base64,AAAA".into(),
        );
        let mut originals = vec![image.clone()];
        let link = SharedLink::new(originals.clone());

        originals.clear();
        assert_eq!(link.images.len(), 1);
        assert_eq!(link.images[0], image);
    }
}
