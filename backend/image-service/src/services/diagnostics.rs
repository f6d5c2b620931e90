//! Best-effort diagnostic sinks
//!
//! Components that need to leave an operator-facing trail receive an
//! `Arc<dyn DiagnosticSink>` at construction. Recording is fire-and-forget:
//! a sink must swallow its own failures.

use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, message: &str);
}

/// Forwards diagnostics to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, message: &str) {
        warn!(target: "image_service::diagnostics", "{}", message);
    }
}

/// Appends `[dd-mm-YYYY HH:MM:SS] message\r\n` lines to a file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        let line = format!(
            "[{}] {}\r\n",
            Utc::now().format("%d-%m-%Y %H:%M:%S"),
            message
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}

impl FileSink {
    fn append_or_log(&self, message: &str) {
        if let Err(e) = self.append(message) {
            tracing::debug!(path = %self.path.display(), error = %e, "Diagnostic log append failed");
        }
    }
}

impl DiagnosticSink for FileSink {
    /// Inside a tokio runtime the append runs on the blocking pool and the
    /// caller does not wait for it.
    fn record(&self, message: &str) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let sink = self.clone();
                let message = message.to_string();
                handle.spawn_blocking(move || sink.append_or_log(&message));
            }
            Err(_) => self.append_or_log(message),
        }
    }
}

/// Fans a record out to every inner sink.
#[derive(Default, Clone)]
pub struct MultiSink {
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl DiagnosticSink for MultiSink {
    fn record(&self, message: &str) {
        for sink in &self.sinks {
            sink.record(message);
        }
    }
}

/// Sink used by the service: tracing, plus a file when one is configured.
pub fn build_sink(log_path: Option<PathBuf>) -> Arc<dyn DiagnosticSink> {
    let sink = MultiSink::new().with(Arc::new(TracingSink));
    match log_path {
        Some(path) => Arc::new(sink.with(Arc::new(FileSink::new(path)))),
        None => Arc::new(sink),
    }
}
