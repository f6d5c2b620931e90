//! Image Service
//!
//! Serves original image files and generate-once, cache-forever thumbnails
//! with HTTP cache-control headers.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
