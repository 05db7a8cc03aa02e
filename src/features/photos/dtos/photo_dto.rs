use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request DTO for saving a captured photo
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SavePhotoDto {
    /// Base64 data-URI of the image (`data:image/...;base64,<data>`)
    #[validate(length(min = 1, message = "No photo data provided"))]
    #[schema(example = "data:image/png;base64,iVBORw0KGgo...")]
    pub photo: String,
}

/// Response DTO for a saved photo
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SavePhotoResponseDto {
    /// Confirmation message containing the generated filename
    pub message: String,
    /// Logical path of the stored file
    pub path: String,
}

/// Response DTO for photo deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletePhotoResponseDto {
    pub message: String,
}

/// File extensions the store lists and serves
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Check if a filename carries one of the allowed image extensions
pub fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Get the content type to serve a stored photo with
pub fn content_type_for(filename: &str) -> &'static str {
    match filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
