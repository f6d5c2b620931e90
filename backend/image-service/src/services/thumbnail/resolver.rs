//! Thumbnail resolver - serves originals and generate-once thumbnails
//!
//! This resolver handles the complete request workflow:
//! 1. Validate the source exists and is an accepted image type
//! 2. Derive the thumbnail key from the requested size
//! 3. Serve the stored thumbnail if one exists
//! 4. Otherwise generate it, persist it, and serve the stored copy
//!
//! There is no locking around check-then-write. Two requests racing on the
//! same missing key both generate, but the output is deterministic and the
//! store refuses to overwrite, so the loser's write is simply dropped.

use super::key::{build_key, ThumbnailKey};
use super::processor::ThumbnailProcessor;
use crate::error::{AppError, Result};
use crate::metrics::{record_thumbnail, ThumbnailOutcome};
use crate::models::{SizeSpec, StoredFile};
use crate::services::diagnostics::DiagnosticSink;
use crate::storage::{normalize_logical_path, FileStore, StorageError};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// MIME types the resolver will derive thumbnails from
pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Resolves request paths against the source and thumbnail stores
pub struct ThumbnailResolver {
    source: Arc<dyn FileStore>,
    thumbs: Arc<dyn FileStore>,
    processor: Arc<ThumbnailProcessor>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl ThumbnailResolver {
    /// Create a new thumbnail resolver
    pub fn new(
        source: Arc<dyn FileStore>,
        thumbs: Arc<dyn FileStore>,
        processor: Arc<ThumbnailProcessor>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            source,
            thumbs,
            processor,
            diagnostics,
        }
    }

    /// Serve an original file from the source store, whatever its type
    pub async fn resolve_original(&self, raw_path: &str) -> Result<StoredFile> {
        let path = logical_path(raw_path)?;

        if !self.source_exists(&path).await {
            return Err(AppError::NotFound(path));
        }

        Ok(StoredFile::load(self.source.as_ref(), &path).await?)
    }

    /// Serve the thumbnail of `raw_path` at `raw_size`, generating it on first request
    pub async fn resolve_thumbnail(&self, raw_path: &str, raw_size: &str) -> Result<StoredFile> {
        let path = match logical_path(raw_path) {
            Ok(path) => path,
            Err(e) => {
                record_thumbnail(ThumbnailOutcome::NotFound);
                return Err(e);
            }
        };

        let mime_type = match self.accepted_image_type(&path).await {
            Some(mime_type) => mime_type,
            None => {
                record_thumbnail(ThumbnailOutcome::NotFound);
                return Err(AppError::NotFound(path));
            }
        };

        let size = SizeSpec::parse(raw_size);
        let key = build_key(&path, &size);

        if let Some(file) = self.load_cached(&key).await {
            debug!(key = %key, "Thumbnail cache hit");
            record_thumbnail(ThumbnailOutcome::Hit);
            return Ok(file);
        }

        match self.generate(&path, mime_type, size, &key).await {
            Ok(file) => {
                record_thumbnail(ThumbnailOutcome::Generated);
                Ok(file)
            }
            Err(e) => {
                error!(source = %path, key = %key, error = %e, "Failed to create thumbnail");
                self.diagnostics
                    .record(&format!("Error creating file: {}", key));
                record_thumbnail(ThumbnailOutcome::Failed);
                Err(e)
            }
        }
    }

    /// Generate, persist and re-read a missing thumbnail
    async fn generate(
        &self,
        path: &str,
        mime_type: String,
        size: SizeSpec,
        key: &ThumbnailKey,
    ) -> Result<StoredFile> {
        info!(source = %path, key = %key, "Generating thumbnail");

        let original_data = self.source.read(path).await?;

        let thumbnail = self
            .processor
            .clone()
            .generate_async(original_data, mime_type, size)
            .await
            .map_err(|source| AppError::Generation {
                key: key.to_string(),
                source,
            })?;

        match self.thumbs.write(key.as_str(), thumbnail.data).await {
            Ok(()) => {}
            Err(StorageError::AlreadyExists(_)) => {
                debug!(key = %key, "Thumbnail written concurrently, keeping existing copy");
            }
            Err(source) => {
                return Err(AppError::WriteFailure {
                    key: key.to_string(),
                    source,
                })
            }
        }

        let file = StoredFile::load(self.thumbs.as_ref(), key.as_str()).await?;

        info!(
            key = %key,
            width = thumbnail.width,
            height = thumbnail.height,
            size = file.size,
            "Thumbnail created successfully"
        );

        Ok(file)
    }

    /// A stored thumbnail, or `None` when it is missing or unreadable
    async fn load_cached(&self, key: &ThumbnailKey) -> Option<StoredFile> {
        match self.thumbs.exists(key.as_str()).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Thumbnail store lookup failed, regenerating");
                return None;
            }
        }

        match StoredFile::load(self.thumbs.as_ref(), key.as_str()).await {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored thumbnail unreadable, regenerating");
                None
            }
        }
    }

    async fn source_exists(&self, path: &str) -> bool {
        match self.source.exists(path).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(source = %path, error = %e, "Source lookup failed");
                false
            }
        }
    }

    /// MIME type of the source if it exists and is an accepted image
    async fn accepted_image_type(&self, path: &str) -> Option<String> {
        if !self.source_exists(path).await {
            return None;
        }

        match self.source.mime_type(path).await {
            Ok(mime_type) if ACCEPTED_MIME_TYPES.contains(&mime_type.as_str()) => Some(mime_type),
            Ok(mime_type) => {
                debug!(source = %path, %mime_type, "Source is not a thumbnailable image");
                None
            }
            Err(e) => {
                warn!(source = %path, error = %e, "Source MIME lookup failed");
                None
            }
        }
    }
}

fn logical_path(raw_path: &str) -> Result<String> {
    normalize_logical_path(raw_path).map_err(|_| AppError::NotFound(raw_path.to_string()))
}
