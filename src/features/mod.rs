pub mod album;
pub mod photos;
