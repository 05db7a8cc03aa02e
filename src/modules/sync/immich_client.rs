//! Immich sync client
//!
//! Best-effort replication of saved photos into a remote Immich album.
//! Failures here are reported as [`SyncError`] and are expected to be
//! logged by the caller, never surfaced to the HTTP client.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::ImmichSyncSettings;
use crate::core::error::AppError;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const ALBUM_TIMEOUT: Duration = Duration::from_secs(10);

/// Device label reported with every uploaded asset
const DEVICE_ID: &str = "snapshot-core";

/// Error from the upload-and-link protocol. Contained within the save
/// path: callers log it and carry on.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("request to Immich failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Immich returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to read photo for upload: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct AssetUploadResponse {
    id: Option<String>,
}

/// Client for the Immich asset-upload and album-link endpoints
pub struct ImmichClient {
    client: Client,
    base_url: String,
    api_key: String,
    album_id: String,
}

impl ImmichClient {
    pub fn new(settings: ImmichSyncSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key,
            album_id: settings.album_id,
        })
    }

    /// Upload a saved photo as an Immich asset and link it into the
    /// configured album.
    ///
    /// The two calls are strictly sequential: the album link needs the
    /// asset id from the upload. An upload that succeeds without
    /// returning an asset id skips the album step silently.
    pub async fn upload_and_link(&self, file_path: &Path, filename: &str) -> Result<(), SyncError> {
        match self.upload_asset(file_path, filename).await? {
            Some(asset_id) if !asset_id.is_empty() => self.add_to_album(&asset_id).await,
            _ => {
                debug!(
                    "Immich upload of {} returned no asset id, skipping album link",
                    filename
                );
                Ok(())
            }
        }
    }

    async fn upload_asset(
        &self,
        file_path: &Path,
        filename: &str,
    ) -> Result<Option<String>, SyncError> {
        let metadata = tokio::fs::metadata(file_path).await?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        // Not every filesystem reports a creation time; the file was
        // written moments ago, so the mtime is an accurate stand-in.
        let created: DateTime<Utc> = metadata.created().map(Into::into).unwrap_or(modified);

        let bytes = tokio::fs::read(file_path).await?;

        let form = multipart::Form::new()
            .part(
                "assetData",
                multipart::Part::bytes(bytes)
                    .file_name(filename.to_string())
                    .mime_str("image/png")?,
            )
            // Deterministic per file + mtime, so Immich can detect re-uploads.
            .text(
                "deviceAssetId",
                format!("{}-{}", filename, modified.timestamp()),
            )
            .text("deviceId", DEVICE_ID)
            .text(
                "fileCreatedAt",
                created.to_rfc3339_opts(SecondsFormat::Micros, true),
            )
            .text(
                "fileModifiedAt",
                modified.to_rfc3339_opts(SecondsFormat::Micros, true),
            )
            .text("isFavorite", "false");

        let response = self
            .client
            .post(format!("{}/assets", self.base_url))
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body: AssetUploadResponse = response.json().await?;
        debug!("Uploaded {} to Immich (asset id: {:?})", filename, body.id);
        Ok(body.id)
    }

    async fn add_to_album(&self, asset_id: &str) -> Result<(), SyncError> {
        let response = self
            .client
            .put(format!("{}/albums/{}/assets", self.base_url, self.album_id))
            .header("x-api-key", &self.api_key)
            .json(&json!({ "ids": [asset_id] }))
            .timeout(ALBUM_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        info!("Asset {} linked into album {}", asset_id, self.album_id);
        Ok(())
    }

    async fn status_error(response: reqwest::Response) -> SyncError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        SyncError::Status { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::State,
        http::HeaderMap,
        routing::{post, put},
        Json, Router,
    };
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone)]
    struct MockImmich {
        /// Asset id the upload endpoint hands back (None -> JSON null)
        asset_id: Option<String>,
        seen_api_keys: Arc<Mutex<Vec<String>>>,
        album_bodies: Arc<Mutex<Vec<serde_json::Value>>>,
    }

    impl MockImmich {
        fn new(asset_id: Option<&str>) -> Self {
            Self {
                asset_id: asset_id.map(str::to_string),
                seen_api_keys: Arc::new(Mutex::new(Vec::new())),
                album_bodies: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    async fn spawn_mock(state: MockImmich) -> String {
        let app = Router::new()
            .route(
                "/assets",
                post(|State(s): State<MockImmich>, headers: HeaderMap| async move {
                    if let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
                        s.seen_api_keys.lock().unwrap().push(key.to_string());
                    }
                    Json(json!({ "id": s.asset_id }))
                }),
            )
            .route(
                "/albums/{album_id}/assets",
                put(
                    |State(s): State<MockImmich>, Json(body): Json<serde_json::Value>| async move {
                        s.album_bodies.lock().unwrap().push(body);
                        Json(json!([]))
                    },
                ),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String) -> ImmichClient {
        ImmichClient::new(ImmichSyncSettings {
            base_url,
            api_key: "test-key".to_string(),
            album_id: "album-1".to_string(),
        })
        .unwrap()
    }

    fn write_photo(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("photo-1700000000000.png");
        std::fs::write(&path, b"fake png bytes").unwrap();
        path
    }

    #[tokio::test]
    async fn upload_then_album_link() {
        let mock = MockImmich::new(Some("asset-1"));
        let base_url = spawn_mock(mock.clone()).await;
        let dir = TempDir::new().unwrap();
        let path = write_photo(&dir);

        client_for(base_url)
            .upload_and_link(&path, "photo-1700000000000.png")
            .await
            .unwrap();

        assert_eq!(
            mock.seen_api_keys.lock().unwrap().as_slice(),
            ["test-key".to_string()]
        );
        assert_eq!(
            mock.album_bodies.lock().unwrap().as_slice(),
            [json!({ "ids": ["asset-1"] })]
        );
    }

    #[tokio::test]
    async fn missing_asset_id_skips_album_link() {
        let mock = MockImmich::new(None);
        let base_url = spawn_mock(mock.clone()).await;
        let dir = TempDir::new().unwrap();
        let path = write_photo(&dir);

        client_for(base_url)
            .upload_and_link(&path, "photo-1700000000000.png")
            .await
            .unwrap();

        assert!(mock.album_bodies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_upload_is_a_status_error() {
        let app = Router::new().route(
            "/assets",
            post(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let dir = TempDir::new().unwrap();
        let path = write_photo(&dir);

        let err = client_for(format!("http://{}", addr))
            .upload_and_link(&path, "photo-1700000000000.png")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                ..
            }
        ));
    }
}
