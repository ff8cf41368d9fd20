//! Defines routes for the gallery API.
//!
//! ## Structure
//! - **Gallery endpoints**
//!   - `POST   /images` — multipart upload (scoped by `x-owner-token`)
//!   - `GET    /images` — list the caller's gallery
//!   - `DELETE /images` — clear the caller's gallery
//!   - `GET    /images/{id}` — fetch one record
//!   - `DELETE /images/{id}` — delete one record
//!   - `POST   /images/{id}/edit` — crop/rotate in place
//!   - `POST   /images/{id}/split` — split into vertical columns
//!   - `GET    /images/{id}/download` — raw bytes with download headers
//!
//! - **Group endpoints**
//!   - `GET    /groups/{id}` — members of a split group
//!   - `GET    /groups/{id}/download` — members zipped into one archive
//!
//! - **Share endpoints**
//!   - `POST   /shares` — snapshot a selection into a 7-day link
//!   - `GET    /shares` — list active links
//!   - `GET    /shares/{id}` — resolve a link (expired links included)
//!   - `DELETE /shares/{id}` — revoke a link

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        image_handlers::{
            clear_images, delete_image, download_group, download_image, edit_image, get_group,
            get_image, list_images, split_image, upload_images,
        },
        share_handlers::{create_share, delete_share, get_share, list_shares},
    },
    services::gallery::GalleryService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Upper bound on a whole multipart request body. Per-file limits are
/// enforced by the service; this only guards against unbounded bodies.
const MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

/// Build and return the router for the gallery API.
///
/// The router carries shared state (`GalleryService`) to all handlers.
pub fn routes() -> Router<GalleryService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // gallery
        .route(
            "/images",
            post(upload_images).get(list_images).delete(clear_images),
        )
        .route("/images/{id}", get(get_image).delete(delete_image))
        .route("/images/{id}/edit", post(edit_image))
        .route("/images/{id}/split", post(split_image))
        .route("/images/{id}/download", get(download_image))
        // split groups
        .route("/groups/{id}", get(get_group))
        .route("/groups/{id}/download", get(download_group))
        // shares
        .route("/shares", post(create_share).get(list_shares))
        .route("/shares/{id}", get(get_share).delete(delete_share))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
