use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::album::handlers::get_album_url;
use crate::features::album::services::AlbumService;

/// Create routes for the album feature
pub fn routes(album_service: Arc<AlbumService>) -> Router {
    Router::new()
        .route("/album-url", get(get_album_url))
        .with_state(album_service)
}
