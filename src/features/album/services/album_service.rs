use crate::core::config::ImmichConfig;
use crate::core::error::{AppError, Result};

/// Resolves the browsable Immich album URL from the configured base URL.
///
/// Pure string transform, no I/O: the API base URL loses its trailing
/// `/api` segment and the album id is appended under `/albums/`.
pub struct AlbumService {
    config: ImmichConfig,
}

impl AlbumService {
    pub fn new(config: ImmichConfig) -> Self {
        Self { config }
    }

    pub fn album_url(&self) -> Result<String> {
        let (Some(base_url), Some(album_id)) = (&self.config.base_url, &self.config.album_id)
        else {
            return Err(AppError::ServiceUnavailable(
                "Immich album URL not configured".to_string(),
            ));
        };

        Ok(resolve_album_url(base_url, album_id))
    }
}

fn resolve_album_url(base_url: &str, album_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = base.strip_suffix("/api").unwrap_or(base);
    format!("{}/albums/{}", base.trim_end_matches('/'), album_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_api_segment() {
        assert_eq!(
            resolve_album_url("https://photos.example/api", "abc123"),
            "https://photos.example/albums/abc123"
        );
    }

    #[test]
    fn strips_trailing_slash_before_api() {
        assert_eq!(
            resolve_album_url("https://photos.example/api/", "abc123"),
            "https://photos.example/albums/abc123"
        );
    }

    #[test]
    fn base_url_without_api_suffix_is_used_as_is() {
        assert_eq!(
            resolve_album_url("https://photos.example", "abc123"),
            "https://photos.example/albums/abc123"
        );
    }

    #[test]
    fn unconfigured_album_is_service_unavailable() {
        let service = AlbumService::new(ImmichConfig {
            base_url: Some("https://photos.example/api".to_string()),
            api_key: None,
            album_id: None,
        });
        let err = service.album_url().unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[test]
    fn album_url_does_not_need_an_api_key() {
        let service = AlbumService::new(ImmichConfig {
            base_url: Some("https://photos.example/api".to_string()),
            api_key: None,
            album_id: Some("abc123".to_string()),
        });
        assert_eq!(
            service.album_url().unwrap(),
            "https://photos.example/albums/abc123"
        );
    }
}
