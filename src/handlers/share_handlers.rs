//! HTTP handlers for shareable links.

use crate::{errors::AppError, services::gallery::GalleryService};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

/// Body for `POST /shares`.
#[derive(Debug, Deserialize)]
pub struct CreateShareReq {
    pub image_ids: Vec<Uuid>,
}

/// POST `/shares` — snapshot a selection into a 7-day link.
pub async fn create_share(
    State(service): State<GalleryService>,
    Json(req): Json<CreateShareReq>,
) -> Result<impl IntoResponse, AppError> {
    let share = service.create_share(&req.image_ids).await?;
    Ok((StatusCode::CREATED, Json(share)))
}

/// GET `/shares` — active links only.
pub async fn list_shares(
    State(service): State<GalleryService>,
) -> Result<impl IntoResponse, AppError> {
    let links = service.list_shares().await?;
    Ok(Json(links))
}

/// GET `/shares/{id}` — resolves expired links too; check the `expired`
/// field before rendering.
pub async fn get_share(
    State(service): State<GalleryService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let share = service.resolve_share(id).await?;
    Ok(Json(share))
}

/// DELETE `/shares/{id}`.
pub async fn delete_share(
    State(service): State<GalleryService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    service.delete_share(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
