use utoipa::OpenApi;

use crate::core::error::ErrorResponse;
use crate::features::album::{dtos as album_dtos, handlers as album_handlers};
use crate::features::photos::{dtos as photos_dtos, handlers as photos_handlers};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Photos
        photos_handlers::list_photos,
        photos_handlers::get_photo,
        photos_handlers::save_photo,
        photos_handlers::delete_photo,
        // Album
        album_handlers::get_album_url,
    ),
    components(
        schemas(
            ErrorResponse,
            // Photos
            photos_dtos::SavePhotoDto,
            photos_dtos::SavePhotoResponseDto,
            photos_dtos::DeletePhotoResponseDto,
            // Album
            album_dtos::AlbumUrlResponseDto,
        )
    ),
    tags(
        (name = "photos", description = "Local photo capture, listing, and deletion"),
        (name = "album", description = "Immich album access"),
    ),
    info(
        title = "SnapShot Photo Management API",
        version = "1.0.0",
        description = "Photo capture backend with optional Immich album sync",
    )
)]
pub struct ApiDoc;
