mod album_handler;

pub use album_handler::*;
