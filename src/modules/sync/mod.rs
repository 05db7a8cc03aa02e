//! Sync module for cloud photo replication
//!
//! Provides the Immich client used to upload saved photos and link them
//! into a shared album.

mod immich_client;

pub use immich_client::{ImmichClient, SyncError};
