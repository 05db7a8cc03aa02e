use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::features::album::dtos::AlbumUrlResponseDto;
use crate::features::album::services::AlbumService;

/// Get the Immich album URL
///
/// Used by the frontend to render a QR code pointing at the shared album.
#[utoipa::path(
    get,
    path = "/album-url",
    tag = "album",
    responses(
        (status = 200, description = "Browsable album URL", body = AlbumUrlResponseDto),
        (status = 503, description = "Immich base URL or album id not configured")
    )
)]
pub async fn get_album_url(
    State(service): State<Arc<AlbumService>>,
) -> Result<Json<AlbumUrlResponseDto>> {
    let album_url = service.album_url()?;
    Ok(Json(AlbumUrlResponseDto { album_url }))
}
