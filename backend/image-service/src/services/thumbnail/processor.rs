//! Thumbnail processor - derives crop-to-fill thumbnails from original images
//!
//! The source is cropped around its centre to the target aspect ratio and the
//! crop is resampled onto a canvas of exactly the requested size, so output
//! is never letterboxed or distorted. Output keeps the source's format.
//!
//! Uses `spawn_blocking` for CPU-intensive operations to avoid blocking the async runtime.

use crate::models::SizeSpec;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Thumbnail generation errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Thumbnail task failed: {0}")]
    Task(String),
}

pub type ProcessingResult<T> = std::result::Result<T, ProcessingError>;

/// Configuration for thumbnail generation
#[derive(Clone, Debug)]
pub struct ThumbnailConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Largest accepted edge of the output canvas
    pub max_dimension: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 75,
            max_dimension: 4096,
        }
    }
}

/// Encoders for the closed set of accepted MIME types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
}

impl OutputFormat {
    pub fn from_mime(mime_type: &str) -> ProcessingResult<Self> {
        match mime_type {
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            "image/gif" => Ok(Self::Gif),
            other => Err(ProcessingError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Source rectangle sampled into the output canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Result of thumbnail generation
#[derive(Debug)]
pub struct ThumbnailResult {
    /// Encoded thumbnail, same format as the source
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

/// Thumbnail processor
#[derive(Debug, Default)]
pub struct ThumbnailProcessor {
    config: ThumbnailConfig,
}

impl ThumbnailProcessor {
    /// Create a new processor with the given configuration
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    /// Create a processor with default configuration
    pub fn with_defaults() -> Self {
        Self::new(ThumbnailConfig::default())
    }

    /// Generate a thumbnail from the given image data (blocking version)
    ///
    /// **Note:** This method performs CPU-intensive operations and should not be called
    /// directly from async code. Use `generate_async` instead.
    pub fn generate(
        &self,
        original_data: &[u8],
        mime_type: &str,
        size: &SizeSpec,
    ) -> ProcessingResult<ThumbnailResult> {
        // Reject unknown types before spending time on decoding
        let format = OutputFormat::from_mime(mime_type)?;

        let img = image::load_from_memory(original_data)
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let (orig_w, orig_h) = img.dimensions();
        debug!(
            original_width = orig_w,
            original_height = orig_h,
            "Processing image for thumbnail"
        );

        let target = resolve_target((orig_w, orig_h), size);
        let (new_w, new_h) = self.canvas_dimensions(target)?;
        let crop = crop_rect((orig_w, orig_h), target);

        let resized = img
            .crop_imm(crop.x, crop.y, crop.width, crop.height)
            .resize_exact(new_w, new_h, FilterType::Triangle);

        let data = encode(&resized, format, self.config.jpeg_quality)?;

        debug!(
            width = new_w,
            height = new_h,
            crop_x = crop.x,
            crop_y = crop.y,
            crop_width = crop.width,
            crop_height = crop.height,
            size = data.len(),
            "Thumbnail generated"
        );

        Ok(ThumbnailResult {
            data,
            width: new_w,
            height: new_h,
        })
    }

    /// Generate a thumbnail asynchronously using a blocking thread pool
    ///
    /// This method offloads the CPU-intensive image processing to a dedicated
    /// thread pool, preventing the async runtime from being blocked.
    pub async fn generate_async(
        self: Arc<Self>,
        original_data: Bytes,
        mime_type: String,
        size: SizeSpec,
    ) -> ProcessingResult<ThumbnailResult> {
        let processor = self.clone();

        tokio::task::spawn_blocking(move || processor.generate(&original_data, &mime_type, &size))
            .await
            .map_err(|e| ProcessingError::Task(format!("Thumbnail task panicked: {e}")))?
    }

    /// Round the real-valued target onto whole pixels and bound-check it
    fn canvas_dimensions(&self, target: (f64, f64)) -> ProcessingResult<(u32, u32)> {
        let (tw, th) = target;
        let (w, h) = (tw.round(), th.round());
        let max = f64::from(self.config.max_dimension);

        if w < 1.0 || h < 1.0 || w > max || h > max {
            return Err(ProcessingError::InvalidDimensions {
                width: tw,
                height: th,
            });
        }

        Ok((w as u32, h as u32))
    }
}

/// Fill in the unset edges of `size` from the source aspect ratio.
///
/// The derived edge stays real-valued; rounding happens only when the canvas
/// is allocated.
pub fn resolve_target(source: (u32, u32), size: &SizeSpec) -> (f64, f64) {
    let (w, h) = (f64::from(source.0), f64::from(source.1));

    match (size.width, size.height) {
        (Some(tw), Some(th)) => (f64::from(tw), f64::from(th)),
        (Some(tw), None) => {
            let tw = f64::from(tw);
            (tw, h * (tw / w))
        }
        (None, Some(th)) => {
            let th = f64::from(th);
            (w * (th / h), th)
        }
        (None, None) => (w, h),
    }
}

/// Centred source rectangle with the same aspect ratio as `target`.
pub fn crop_rect(source: (u32, u32), target: (f64, f64)) -> CropRect {
    let (w, h) = (f64::from(source.0), f64::from(source.1));
    let cmp_x = w / target.0;
    let cmp_y = h / target.1;

    let mut rect = CropRect {
        x: 0,
        y: 0,
        width: source.0,
        height: source.1,
    };

    if cmp_x > cmp_y {
        let kept = w / cmp_x * cmp_y;
        rect.width = clamp_edge(kept.round(), source.0);
        rect.x = ((w - kept) / 2.0).round() as u32;
    } else if cmp_y > cmp_x {
        let kept = h / cmp_y * cmp_x;
        rect.height = clamp_edge(kept.round(), source.1);
        rect.y = ((h - kept) / 2.0).round() as u32;
    }

    rect
}

fn clamp_edge(value: f64, limit: u32) -> u32 {
    (value as u32).clamp(1, limit)
}

fn encode(img: &DynamicImage, format: OutputFormat, jpeg_quality: u8) -> ProcessingResult<Bytes> {
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);

    let written = match format {
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_to(&mut cursor, ImageOutputFormat::Jpeg(jpeg_quality)),
        OutputFormat::Png => img.write_to(&mut cursor, ImageOutputFormat::Png),
        OutputFormat::Gif => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut cursor, ImageOutputFormat::Gif)
        }
    };
    written.map_err(|e| ProcessingError::Encode(e.to_string()))?;

    Ok(Bytes::from(buf))
}
