use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use base64::prelude::*;
use chrono::Utc;
use tracing::{info, warn};

use crate::core::error::{AppError, Result};
use crate::features::photos::dtos::{content_type_for, has_allowed_extension};
use crate::modules::sync::ImmichClient;

/// A freshly persisted photo
#[derive(Debug)]
pub struct SavedPhoto {
    pub filename: String,
    pub path: String,
}

/// Local photo store.
///
/// Sole owner of the photo directory: every read, write, and delete of
/// photo bytes goes through this service. Filenames embed the capture
/// time in milliseconds, so descending lexicographic order is
/// most-recent-first for store-generated files.
pub struct PhotoService {
    photos_dir: PathBuf,
    immich: Option<Arc<ImmichClient>>,
}

impl PhotoService {
    pub fn new(photos_dir: PathBuf, immich: Option<Arc<ImmichClient>>) -> Self {
        Self { photos_dir, immich }
    }

    /// Create the photo directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.photos_dir)
            .await
            .map_err(|e| {
                AppError::Internal(format!(
                    "Failed to create photo directory '{}': {}",
                    self.photos_dir.display(),
                    e
                ))
            })
    }

    /// List stored photo filenames, most recent first.
    ///
    /// Only files with allowed image extensions are returned; anything
    /// else living in the directory is ignored.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.photos_dir).await.map_err(|e| {
            AppError::Internal(format!("Failed to read photo directory: {}", e))
        })?;

        let mut photos = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            AppError::Internal(format!("Failed to read photo directory: {}", e))
        })? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };

            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if is_file && has_allowed_extension(name) {
                photos.push(name.to_string());
            }
        }

        photos.sort_unstable_by(|a, b| b.cmp(a));
        Ok(photos)
    }

    /// Read a stored photo, returning its bytes and content type
    pub async fn get(&self, filename: &str) -> Result<(Vec<u8>, &'static str)> {
        let file_path = self.resolve(filename)?;

        let metadata = match tokio::fs::metadata(&file_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound("Photo not found".to_string()))
            }
            Err(e) => return Err(AppError::Internal(format!("Failed to read photo: {}", e))),
        };
        if !metadata.is_file() {
            return Err(AppError::NotFound("Photo not found".to_string()));
        }

        let bytes = tokio::fs::read(&file_path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read photo: {}", e)))?;

        Ok((bytes, content_type_for(filename)))
    }

    /// Decode a `data:image/...` data-URI and persist it as a new photo.
    ///
    /// The file is always written as `photo-<unix_millis>.png` regardless
    /// of the media type hinted in the URI header. When an Immich client
    /// is configured the photo is uploaded afterwards; upload failures are
    /// logged and never affect the result of the local save.
    pub async fn save(&self, data_uri: &str) -> Result<SavedPhoto> {
        let (header, payload) = data_uri
            .split_once(',')
            .ok_or_else(|| AppError::InvalidFormat("missing base64 payload".to_string()))?;

        if !header.starts_with("data:image/") {
            return Err(AppError::InvalidFormat(
                "expected a data:image/ URI".to_string(),
            ));
        }

        let bytes = BASE64_STANDARD.decode(payload.trim())?;

        let filename = format!("photo-{}.png", Utc::now().timestamp_millis());
        let file_path = self.photos_dir.join(&filename);

        tokio::fs::write(&file_path, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to save photo: {}", e)))?;

        info!("Photo saved: {} ({} bytes)", filename, bytes.len());

        // Best-effort cloud sync; the local save already succeeded.
        if let Some(client) = &self.immich {
            if let Err(e) = client.upload_and_link(&file_path, &filename).await {
                warn!("Failed to upload {} to Immich: {}", filename, e);
            }
        }

        Ok(SavedPhoto {
            path: format!("./photos/{}", filename),
            filename,
        })
    }

    /// Remove a stored photo
    pub async fn delete(&self, filename: &str) -> Result<()> {
        let file_path = self.resolve(filename)?;

        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => {
                info!("Photo deleted: {}", filename);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound("Photo not found".to_string()))
            }
            Err(e) => Err(AppError::Internal(format!("Failed to delete photo: {}", e))),
        }
    }

    /// Validate a client-supplied filename and resolve it inside the store.
    ///
    /// The filename must be a single normal path component: separators,
    /// `..`, and anything else that could escape the photo directory are
    /// rejected before touching the filesystem.
    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            return Err(AppError::BadRequest("Invalid filename".to_string()));
        }

        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.photos_dir.join(filename)),
            _ => Err(AppError::BadRequest("Invalid filename".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // 1x1 transparent PNG
    const PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    fn service(dir: &TempDir) -> PhotoService {
        PhotoService::new(dir.path().to_path_buf(), None)
    }

    fn png_data_uri() -> String {
        format!("data:image/png;base64,{}", PNG_BASE64)
    }

    #[tokio::test]
    async fn save_writes_decoded_bytes() {
        let dir = TempDir::new().unwrap();
        let saved = service(&dir).save(&png_data_uri()).await.unwrap();

        assert!(saved.filename.starts_with("photo-"));
        assert!(saved.filename.ends_with(".png"));
        assert_eq!(saved.path, format!("./photos/{}", saved.filename));

        let on_disk = std::fs::read(dir.path().join(&saved.filename)).unwrap();
        assert_eq!(on_disk, BASE64_STANDARD.decode(PNG_BASE64).unwrap());
    }

    #[tokio::test]
    async fn save_rejects_non_image_data_uri() {
        let dir = TempDir::new().unwrap();
        let err = service(&dir)
            .save("data:text/plain;base64,aGVsbG8=")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFormat(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn save_rejects_uri_without_payload() {
        let dir = TempDir::new().unwrap();
        let err = service(&dir).save("data:image/png;base64").await.unwrap_err();

        assert!(matches!(err, AppError::InvalidFormat(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn save_rejects_invalid_base64() {
        let dir = TempDir::new().unwrap();
        let err = service(&dir)
            .save("data:image/png;base64,!!!not-base64!!!")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidEncoding(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn list_filters_extensions_and_sorts_descending() {
        let dir = TempDir::new().unwrap();
        for name in [
            "photo-1700000000001.png",
            "photo-1700000000003.png",
            "photo-1700000000002.png",
            "manual-upload.JPG",
            "notes.txt",
            "no-extension",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let photos = service(&dir).list().await.unwrap();
        assert_eq!(
            photos,
            vec![
                "photo-1700000000003.png",
                "photo-1700000000002.png",
                "photo-1700000000001.png",
                "manual-upload.JPG",
            ]
        );
    }

    #[tokio::test]
    async fn get_missing_photo_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = service(&dir).get("photo-1.png").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_after_delete_is_not_found() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let saved = svc.save(&png_data_uri()).await.unwrap();

        let (bytes, content_type) = svc.get(&saved.filename).await.unwrap();
        assert_eq!(content_type, "image/png");
        assert!(!bytes.is_empty());

        svc.delete(&saved.filename).await.unwrap();
        let err = svc.get(&saved.filename).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_missing_photo_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = service(&dir).delete("photo-1.png").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn traversal_filenames_are_rejected() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        for name in ["../secret.png", "..", "a/b.png", "a\\b.png", ""] {
            let err = svc.get(name).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "accepted {:?}", name);
        }
    }

    #[tokio::test]
    async fn save_succeeds_when_sync_endpoint_is_unreachable() {
        use crate::core::config::ImmichSyncSettings;

        let dir = TempDir::new().unwrap();
        let client = ImmichClient::new(ImmichSyncSettings {
            // Nothing listens here; the upload fails with a connect error.
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
            album_id: "album-1".to_string(),
        })
        .unwrap();
        let svc = PhotoService::new(dir.path().to_path_buf(), Some(Arc::new(client)));

        let saved = svc.save(&png_data_uri()).await.unwrap();
        assert!(dir.path().join(&saved.filename).exists());
    }
}
