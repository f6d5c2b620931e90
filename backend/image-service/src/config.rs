/// Configuration management for image-service
///
/// Loads configuration from environment variables with sensible defaults.
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub thumbnail: ThumbnailSettings,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Site-specific URL prefix stripped before paths reach the source store
    pub path_prefix: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    pub source_root: PathBuf,
    pub thumbs_root: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CacheConfig {
    pub max_age_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ThumbnailSettings {
    pub jpeg_quality: u8,
    pub max_dimension: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DiagnosticsConfig {
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                path_prefix: String::new(),
            },
            storage: StorageConfig {
                source_root: PathBuf::from("/opt/redmine/files"),
                thumbs_root: PathBuf::from("thumbs"),
            },
            cache: CacheConfig {
                max_age_secs: 86_400,
            },
            thumbnail: ThumbnailSettings {
                jpeg_quality: 75,
                max_dimension: 4096,
            },
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Config {
            app: AppConfig {
                host: std::env::var("IMAGE_SERVICE_HOST").unwrap_or(defaults.app.host),
                port: env_or("IMAGE_SERVICE_PORT", defaults.app.port),
                path_prefix: std::env::var("IMAGE_SERVICE_PATH_PREFIX")
                    .map(|p| normalize_prefix(&p))
                    .unwrap_or(defaults.app.path_prefix),
            },
            storage: StorageConfig {
                source_root: std::env::var("SOURCE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.source_root),
                thumbs_root: std::env::var("THUMBS_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.thumbs_root),
            },
            cache: CacheConfig {
                max_age_secs: env_or("CACHE_MAX_AGE_SECS", defaults.cache.max_age_secs),
            },
            thumbnail: ThumbnailSettings {
                jpeg_quality: env_or("THUMB_JPEG_QUALITY", defaults.thumbnail.jpeg_quality)
                    .clamp(1, 100),
                max_dimension: env_or("THUMB_MAX_DIMENSION", defaults.thumbnail.max_dimension),
            },
            diagnostics: DiagnosticsConfig {
                log_path: std::env::var("DIAGNOSTIC_LOG_PATH")
                    .ok()
                    .filter(|p| !p.trim().is_empty())
                    .map(PathBuf::from),
            },
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// `images/` and `/images/` both become `/images`; `/` becomes empty.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
