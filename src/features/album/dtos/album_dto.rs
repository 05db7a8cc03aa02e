use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response DTO carrying the browsable album URL
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AlbumUrlResponseDto {
    /// Direct link to the Immich album (e.g. for QR code generation)
    pub album_url: String,
}
