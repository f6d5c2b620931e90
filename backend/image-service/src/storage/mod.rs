//! File stores backing the service
//!
//! Both the read-only source store and the read/write thumbnail store speak
//! the same [`FileStore`] contract, addressed by store-relative logical paths
//! (`albums/2024/photo.jpg`). [`LocalFileStore`] roots that namespace in a
//! directory on disk.

mod local;
mod path;

pub use local::LocalFileStore;
pub use path::{normalize_logical_path, PathParts};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    /// Write-if-absent lost against an existing file
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
            _ => StorageError::Io {
                path: path.to_string(),
                source,
            },
        }
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Path-addressed file provider.
///
/// Implementations must be safe to share across worker threads; the only
/// mutation is [`FileStore::write`], which never replaces an existing file.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Whether a regular file exists at `path`.
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    async fn read(&self, path: &str) -> StorageResult<Bytes>;

    /// MIME type of the file, e.g. `image/jpeg`.
    async fn mime_type(&self, path: &str) -> StorageResult<String>;

    /// Size in bytes.
    async fn size(&self, path: &str) -> StorageResult<u64>;

    async fn last_modified(&self, path: &str) -> StorageResult<DateTime<Utc>>;

    /// Atomically create `path` with `contents`.
    ///
    /// Fails with [`StorageError::AlreadyExists`] if the file is already
    /// present; the existing file is left untouched.
    async fn write(&self, path: &str, contents: Bytes) -> StorageResult<()>;
}
