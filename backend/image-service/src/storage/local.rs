/// Filesystem-rooted file store
///
/// Each store owns one root directory; logical paths are resolved below it
/// after normalization, so `..` can never reach outside the root.
use super::{normalize_logical_path, FileStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Bytes read from the head of a file for content sniffing
const SNIFF_LEN: u64 = 64;

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let logical = normalize_logical_path(path)?;
        Ok(logical
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment)))
    }

    async fn metadata(&self, path: &str) -> StorageResult<std::fs::Metadata> {
        let full = self.resolve(path)?;
        let meta = tokio::fs::metadata(&full)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(path.to_string()));
        }
        Ok(meta)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        match self.metadata(path).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn read(&self, path: &str) -> StorageResult<Bytes> {
        let full = self.resolve(path)?;
        tokio::fs::read(&full)
            .await
            .map(Bytes::from)
            .map_err(|e| StorageError::io(path, e))
    }

    async fn mime_type(&self, path: &str) -> StorageResult<String> {
        let full = self.resolve(path)?;
        let file = tokio::fs::File::open(&full)
            .await
            .map_err(|e| StorageError::io(path, e))?;

        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        file.take(SNIFF_LEN)
            .read_to_end(&mut head)
            .await
            .map_err(|e| StorageError::io(path, e))?;

        let detected = sniff_mime(&head).or_else(|| mime_from_extension(path));
        Ok(detected.unwrap_or(OCTET_STREAM).to_string())
    }

    async fn size(&self, path: &str) -> StorageResult<u64> {
        Ok(self.metadata(path).await?.len())
    }

    async fn last_modified(&self, path: &str) -> StorageResult<DateTime<Utc>> {
        let modified = self
            .metadata(path)
            .await?
            .modified()
            .map_err(|e| StorageError::io(path, e))?;
        Ok(DateTime::<Utc>::from(modified))
    }

    async fn write(&self, path: &str, contents: Bytes) -> StorageResult<()> {
        let full = self.resolve(path)?;
        let logical = path.to_string();

        tokio::task::spawn_blocking(move || write_new_file(&full, &contents, &logical))
            .await
            .map_err(|e| StorageError::Io {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            })??;

        debug!(path = %path, "File written");
        Ok(())
    }
}

/// Stage `contents` next to `target` and link it into place without
/// replacing anything already there.
fn write_new_file(target: &Path, contents: &[u8], logical: &str) -> StorageResult<()> {
    let parent = target
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(logical.to_string()))?;
    std::fs::create_dir_all(parent).map_err(|e| StorageError::io(logical, e))?;

    let mut staged =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| StorageError::io(logical, e))?;
    staged
        .write_all(contents)
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|e| StorageError::io(logical, e))?;

    staged
        .persist_noclobber(target)
        .map(|_| ())
        .map_err(|e| StorageError::io(logical, e.error))
}

fn sniff_mime(head: &[u8]) -> Option<&'static str> {
    use image::ImageFormat;

    match image::guess_format(head).ok()? {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::Ico => Some("image/x-icon"),
        _ => None,
    }
}

fn mime_from_extension(path: &str) -> Option<&'static str> {
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}
