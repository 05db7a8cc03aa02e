use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub immich: ImmichConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    /// Directory holding the saved photos (flat, no nesting)
    pub photos_dir: PathBuf,
    /// Directory with the static frontend assets
    pub public_dir: PathBuf,
}

/// Immich server configuration for cloud sync.
///
/// Every field is optional: an incomplete configuration is not an error,
/// it only disables the sync client (and, for the URL fields, the album
/// URL endpoint).
#[derive(Debug, Clone, Default)]
pub struct ImmichConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub album_id: Option<String>,
}

/// The complete credential set required to run the sync client.
#[derive(Debug, Clone)]
pub struct ImmichSyncSettings {
    pub base_url: String,
    pub api_key: String,
    pub album_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            immich: ImmichConfig::from_env(),
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 50 * 1024 * 1024; // 50MB data-URI payloads

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let photos_dir =
            PathBuf::from(env::var("PHOTOS_DIR").unwrap_or_else(|_| "photos".to_string()));
        let public_dir =
            PathBuf::from(env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()));

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            photos_dir,
            public_dir,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ImmichConfig {
    /// Reads the Immich settings, treating empty strings as unset.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|s| !s.is_empty());

        Self {
            base_url: non_empty("IMMICH_BASE_URL"),
            api_key: non_empty("IMMICH_API_KEY"),
            album_id: non_empty("IMMICH_ALBUM_ID"),
        }
    }

    /// Returns the full credential set, or `None` if any value is missing.
    pub fn sync_settings(&self) -> Option<ImmichSyncSettings> {
        match (&self.base_url, &self.api_key, &self.album_id) {
            (Some(base_url), Some(api_key), Some(album_id)) => Some(ImmichSyncSettings {
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                album_id: album_id.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_settings_requires_all_three_values() {
        let config = ImmichConfig {
            base_url: Some("https://photos.example/api".to_string()),
            api_key: None,
            album_id: Some("abc123".to_string()),
        };
        assert!(config.sync_settings().is_none());

        let config = ImmichConfig {
            base_url: Some("https://photos.example/api".to_string()),
            api_key: Some("key".to_string()),
            album_id: Some("abc123".to_string()),
        };
        let settings = config.sync_settings().expect("complete config");
        assert_eq!(settings.album_id, "abc123");
    }
}
