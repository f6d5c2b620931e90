/// Data models for image-service
///
/// - [`SizeSpec`]: requested thumbnail dimensions parsed from `?size=w,h`
/// - [`StoredFile`]: a resolved file (original or thumbnail) ready to serve
use crate::storage::{FileStore, StorageResult};
use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Requested thumbnail dimensions; either edge may be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SizeSpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl SizeSpec {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }

    /// Parse the raw `size` query value, e.g. `200,150`, `200,` or `,150`.
    ///
    /// Parsing is permissive: a slot that is empty, non-numeric, zero or out
    /// of range is simply unset. Tokens past the second are ignored.
    pub fn parse(raw: &str) -> Self {
        let mut tokens = raw.split(',');
        let width = tokens.next().and_then(parse_dimension);
        let height = tokens.next().and_then(parse_dimension);
        Self { width, height }
    }

    pub fn is_unset(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// A slot counts only when it is made of ASCII digits alone, so `+5`, ` 5`
/// and `5px` are all unset.
fn parse_dimension(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u32>().ok().filter(|&v| v > 0)
}

/// A file resolved from one of the stores, with everything needed to build
/// the cache-control response.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Logical path the file was resolved at; the ETag is derived from it
    pub path: String,
    pub content: Bytes,
    pub mime_type: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl StoredFile {
    /// Read a file and its metadata from `store`.
    pub async fn load(store: &dyn FileStore, path: &str) -> StorageResult<Self> {
        let content = store.read(path).await?;
        let mime_type = store.mime_type(path).await?;
        let size = store.size(path).await?;
        let last_modified = store.last_modified(path).await?;

        Ok(Self {
            path: path.to_string(),
            content,
            mime_type,
            size,
            last_modified,
        })
    }

    /// Quoted MD5 hex digest of the logical path.
    ///
    /// Identity only: the digest does not change with file contents.
    pub fn etag(&self) -> String {
        format!("\"{:x}\"", md5::compute(self.path.as_bytes()))
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}
