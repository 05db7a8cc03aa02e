mod album_service;

pub use album_service::AlbumService;
