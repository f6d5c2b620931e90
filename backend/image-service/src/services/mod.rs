/// Business logic layer for image-service
pub mod diagnostics;
pub mod thumbnail;

pub use diagnostics::{build_sink, DiagnosticSink, FileSink, MultiSink, TracingSink};
pub use thumbnail::{ThumbnailProcessor, ThumbnailResolver};
