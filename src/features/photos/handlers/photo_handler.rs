use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::photos::dtos::{DeletePhotoResponseDto, SavePhotoDto, SavePhotoResponseDto};
use crate::features::photos::services::PhotoService;

/// List all stored photos, most recent first
#[utoipa::path(
    get,
    path = "/photos",
    tag = "photos",
    responses(
        (status = 200, description = "Photo filenames in descending order", body = Vec<String>),
        (status = 500, description = "Photo directory could not be read")
    )
)]
pub async fn list_photos(State(service): State<Arc<PhotoService>>) -> Result<Json<Vec<String>>> {
    let photos = service.list().await?;
    Ok(Json(photos))
}

/// Serve an individual photo file
#[utoipa::path(
    get,
    path = "/photos/{filename}",
    tag = "photos",
    params(
        ("filename" = String, Path, description = "Stored photo filename")
    ),
    responses(
        (status = 200, description = "Raw image bytes"),
        (status = 400, description = "Invalid filename"),
        (status = 404, description = "Photo not found")
    )
)]
pub async fn get_photo(
    State(service): State<Arc<PhotoService>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse> {
    let (bytes, content_type) = service.get(&filename).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        bytes,
    ))
}

/// Save a base64-encoded photo
///
/// Accepts a `data:image/...;base64,` data-URI, persists it locally, and
/// uploads it to the configured Immich album as a best-effort side effect.
#[utoipa::path(
    post,
    path = "/photos",
    tag = "photos",
    request_body = SavePhotoDto,
    responses(
        (status = 200, description = "Photo saved", body = SavePhotoResponseDto),
        (status = 400, description = "Malformed data-URI or invalid base64")
    )
)]
pub async fn save_photo(
    State(service): State<Arc<PhotoService>>,
    AppJson(dto): AppJson<SavePhotoDto>,
) -> Result<Json<SavePhotoResponseDto>> {
    dto.validate()
        .map_err(|_| AppError::BadRequest("No photo data provided".to_string()))?;

    let saved = service.save(&dto.photo).await?;

    Ok(Json(SavePhotoResponseDto {
        message: format!("Photo saved: {}", saved.filename),
        path: saved.path,
    }))
}

/// Delete a photo from local storage
#[utoipa::path(
    delete,
    path = "/photos/{filename}",
    tag = "photos",
    params(
        ("filename" = String, Path, description = "Stored photo filename")
    ),
    responses(
        (status = 200, description = "Photo deleted", body = DeletePhotoResponseDto),
        (status = 400, description = "Invalid filename"),
        (status = 404, description = "Photo not found")
    )
)]
pub async fn delete_photo(
    State(service): State<Arc<PhotoService>>,
    Path(filename): Path<String>,
) -> Result<Json<DeletePhotoResponseDto>> {
    service.delete(&filename).await?;

    Ok(Json(DeletePhotoResponseDto {
        message: "Photo deleted".to_string(),
    }))
}
