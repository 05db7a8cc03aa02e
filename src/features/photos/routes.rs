use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::features::photos::handlers::{delete_photo, get_photo, list_photos, save_photo};
use crate::features::photos::services::PhotoService;

/// Create routes for the photos feature
pub fn routes(photo_service: Arc<PhotoService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/photos",
            // Data-URI payloads are ~4/3 the image size, so the POST route
            // needs a generous body limit.
            get(list_photos)
                .post(save_photo)
                .layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/photos/{filename}", get(get_photo).delete(delete_photo))
        .with_state(photo_service)
}
