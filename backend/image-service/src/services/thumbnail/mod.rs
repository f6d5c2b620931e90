//! Thumbnail derivation and caching
//!
//! This module provides the generate-once thumbnail pipeline:
//! - Key builder mapping (source path, size) to a stored thumbnail path
//! - Image processor for crop-to-fill resizing and re-encoding
//! - Resolver coordinating lookup, generation and persistence

pub mod key;
pub mod processor;
pub mod resolver;

pub use key::{build_key, ThumbnailKey};
pub use processor::{
    OutputFormat, ProcessingError, ThumbnailConfig, ThumbnailProcessor, ThumbnailResult,
};
pub use resolver::{ThumbnailResolver, ACCEPTED_MIME_TYPES};
