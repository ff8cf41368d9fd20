//! HTTP handlers for gallery images and split groups.
//! Parses the wire shapes and delegates the rules to `GalleryService`.

use crate::{
    errors::AppError,
    services::export,
    services::gallery::{GalleryService, UploadFile},
    transform::{self, CropRegion},
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

pub const OWNER_TOKEN_HEADER: &str = "x-owner-token";

/// Body for `POST /images/{id}/edit`.
#[derive(Debug, Deserialize)]
pub struct EditImageReq {
    pub crop: CropRegion,
    #[serde(default)]
    pub rotation: f64,
}

/// Body for `POST /images/{id}/split`.
#[derive(Debug, Deserialize)]
pub struct SplitImageReq {
    pub columns: u32,
}

/// Pull the caller's gallery identity out of the request headers.
fn owner_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(OWNER_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::bad_request(format!("missing {OWNER_TOKEN_HEADER} header")))
}

/// POST `/images` — multipart upload of one or more files.
pub async fn upload_images(
    State(service): State<GalleryService>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let owner = owner_token(&headers)?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {err}")))?
    {
        let name = field
            .file_name()
            .map(str::to_string)
            .or_else(|| field.name().map(str::to_string))
            .unwrap_or_default();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::bad_request(format!("failed reading upload: {err}")))?;
        files.push(UploadFile { name, bytes });
    }

    let report = service.upload(&owner, files).await?;
    let status = if report.rejected.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(report)))
}

/// GET `/images` — the caller's gallery, oldest first.
pub async fn list_images(
    State(service): State<GalleryService>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let owner = owner_token(&headers)?;
    let images = service.list_images(&owner).await?;
    Ok(Json(images))
}

/// GET `/images/{id}`.
pub async fn get_image(
    State(service): State<GalleryService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let image = service.get_image(id).await?;
    Ok(Json(image))
}

/// DELETE `/images/{id}`.
pub async fn delete_image(
    State(service): State<GalleryService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    service.delete_image(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE `/images` — clear the caller's gallery.
pub async fn clear_images(
    State(service): State<GalleryService>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let owner = owner_token(&headers)?;
    let deleted = service.clear_images(&owner).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

/// POST `/images/{id}/edit` — crop/rotate in place.
pub async fn edit_image(
    State(service): State<GalleryService>,
    Path(id): Path<Uuid>,
    Json(req): Json<EditImageReq>,
) -> Result<impl IntoResponse, AppError> {
    let image = service.edit_image(id, req.crop, req.rotation).await?;
    Ok(Json(image))
}

/// POST `/images/{id}/split` — split into vertical columns.
pub async fn split_image(
    State(service): State<GalleryService>,
    Path(id): Path<Uuid>,
    Json(req): Json<SplitImageReq>,
) -> Result<impl IntoResponse, AppError> {
    let parts = service.split_image(id, req.columns).await?;
    Ok((StatusCode::CREATED, Json(parts)))
}

/// GET `/images/{id}/download` — raw bytes with download headers.
pub async fn download_image(
    State(service): State<GalleryService>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let image = service.get_image(id).await?;
    let (mime, bytes) = transform::decode_data_url(&image.data_url)
        .map_err(|err| AppError::internal(err.to_string()))?;

    let mut response = Response::new(Body::from(bytes));
    set_download_headers(response.headers_mut(), &mime, &image.name, image.size);
    Ok(response)
}

/// GET `/groups/{id}` — members of one split group.
pub async fn get_group(
    State(service): State<GalleryService>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let members = service.group_images(id).await?;
    Ok(Json(members))
}

/// GET `/groups/{id}/download` — all members zipped into one archive.
pub async fn download_group(
    State(service): State<GalleryService>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let members = service.group_images(id).await?;
    let archive = export::zip_images(&members)?;
    let size = archive.len() as i64;

    let mut response = Response::new(Body::from(archive));
    set_download_headers(
        response.headers_mut(),
        "application/zip",
        &format!("{id}.zip"),
        size,
    );
    Ok(response)
}

fn set_download_headers(headers: &mut HeaderMap, mime: &str, filename: &str, length: i64) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&length.max(0).to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
}
