mod album_dto;

pub use album_dto::*;
