//! Shared fixtures for image-service integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb, RgbImage};
use image_service::services::{DiagnosticSink, ThumbnailProcessor, ThumbnailResolver};
use image_service::storage::{FileStore, LocalFileStore, StorageError, StorageResult};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn encode(img: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn gradient(width: u32, height: u32) -> DynamicImage {
    let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, encode(gradient(width, height), ImageOutputFormat::Jpeg(90))).unwrap();
}

pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    std::fs::write(
        dir.join(name),
        encode(gradient(width, height), ImageOutputFormat::Png),
    )
    .unwrap();
}

pub fn write_bmp(dir: &Path, name: &str, width: u32, height: u32) {
    std::fs::write(
        dir.join(name),
        encode(gradient(width, height), ImageOutputFormat::Bmp),
    )
    .unwrap();
}

/// Collects diagnostic records for assertions.
#[derive(Default)]
pub struct CollectingSink {
    pub messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Pass,
    Fail,
    /// Another writer lands the same file first
    LoseRace,
}

/// Wraps a store, counting writes and optionally failing them.
pub struct InstrumentedStore {
    inner: LocalFileStore,
    pub writes: AtomicUsize,
    mode: WriteMode,
}

impl InstrumentedStore {
    pub fn new(inner: LocalFileStore) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            mode: WriteMode::Pass,
        }
    }

    pub fn with_mode(inner: LocalFileStore, mode: WriteMode) -> Self {
        Self {
            mode,
            ..Self::new(inner)
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileStore for InstrumentedStore {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &str) -> StorageResult<Bytes> {
        self.inner.read(path).await
    }

    async fn mime_type(&self, path: &str) -> StorageResult<String> {
        self.inner.mime_type(path).await
    }

    async fn size(&self, path: &str) -> StorageResult<u64> {
        self.inner.size(path).await
    }

    async fn last_modified(&self, path: &str) -> StorageResult<DateTime<Utc>> {
        self.inner.last_modified(path).await
    }

    async fn write(&self, path: &str, contents: Bytes) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            WriteMode::Pass => self.inner.write(path, contents).await,
            WriteMode::Fail => Err(StorageError::Io {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            }),
            WriteMode::LoseRace => {
                self.inner.write(path, contents).await?;
                Err(StorageError::AlreadyExists(path.to_string()))
            }
        }
    }
}

pub struct Harness {
    pub source_dir: TempDir,
    pub thumbs_dir: TempDir,
    pub thumbs: Arc<InstrumentedStore>,
    pub sink: Arc<CollectingSink>,
    pub resolver: Arc<ThumbnailResolver>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(WriteMode::Pass)
    }

    pub fn with_write_mode(mode: WriteMode) -> Self {
        Self::build(mode)
    }

    fn build(mode: WriteMode) -> Self {
        let source_dir = tempfile::tempdir().unwrap();
        let thumbs_dir = tempfile::tempdir().unwrap();

        let local = LocalFileStore::new(thumbs_dir.path());
        let thumbs = Arc::new(InstrumentedStore::with_mode(local, mode));
        let sink = Arc::new(CollectingSink::default());

        let resolver = Arc::new(ThumbnailResolver::new(
            Arc::new(LocalFileStore::new(source_dir.path())),
            thumbs.clone(),
            Arc::new(ThumbnailProcessor::with_defaults()),
            sink.clone(),
        ));

        Self {
            source_dir,
            thumbs_dir,
            thumbs,
            sink,
            resolver,
        }
    }
}
