//! Logger module
//!
//! Logging is an injected capability: the request path only ever sees a
//! `&dyn LogSink`, so handlers can be exercised against an in-memory sink.
//!
//! - Per-request decision lines (`[200]`, `[404]`, `[500]`)
//! - Optional access log in several formats
//! - Connection and startup errors

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use std::io;

/// Destination for log lines
pub trait LogSink: Send + Sync {
    /// Informational lines (successful decisions, startup)
    fn write_info(&self, message: &str);
    /// Errors and warnings
    fn write_error(&self, message: &str);
    /// Access log entries
    fn write_access(&self, message: &str);
}

pub fn log_serving_content(sink: &dyn LogSink, uri: &str) {
    sink.write_info(&format!("[200]: serving content {uri}"));
}

pub fn log_serving_listing(sink: &dyn LogSink, request_path: &str) {
    sink.write_info(&format!("[200]: serving directory listing of {request_path}"));
}

pub fn log_not_found(sink: &dyn LogSink, uri: &str) {
    sink.write_error(&format!("[404]: file not found '{uri}'"));
}

pub fn log_open_failed(sink: &dyn LogSink, uri: &str, err: &io::Error) {
    sink.write_error(&format!("[500]: unable to open requested file '{uri}': {err}"));
}

pub fn log_listing_truncated(sink: &dyn LogSink, request_path: &str, entries: usize) {
    log_warning(
        sink,
        &format!("directory listing of {request_path} truncated after {entries} entries"),
    );
}

pub fn log_warning(sink: &dyn LogSink, message: &str) {
    sink.write_error(&format!("[WARN] {message}"));
}

pub fn log_error(sink: &dyn LogSink, message: &str) {
    sink.write_error(&format!("[ERROR] {message}"));
}

pub fn log_connection_error(sink: &dyn LogSink, err: &impl std::fmt::Debug) {
    log_error(sink, &format!("Failed to serve connection: {err:?}"));
}

pub fn log_access(sink: &dyn LogSink, entry: &AccessLogEntry, format: AccessLogFormat) {
    sink.write_access(&entry.format(format));
}

#[cfg(test)]
pub mod testing {
    use super::LogSink;
    use std::sync::Mutex;

    /// Which stream a captured line was written to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Stream {
        Info,
        Error,
        Access,
    }

    /// Sink that keeps every line in memory
    #[derive(Default)]
    pub struct MemorySink {
        lines: Mutex<Vec<(Stream, String)>>,
    }

    impl MemorySink {
        pub fn lines(&self) -> Vec<(Stream, String)> {
            self.lines.lock().unwrap().clone()
        }

        fn push(&self, stream: Stream, message: &str) {
            self.lines.lock().unwrap().push((stream, message.to_string()));
        }
    }

    impl LogSink for MemorySink {
        fn write_info(&self, message: &str) {
            self.push(Stream::Info, message);
        }

        fn write_error(&self, message: &str) {
            self.push(Stream::Error, message);
        }

        fn write_access(&self, message: &str) {
            self.push(Stream::Access, message);
        }
    }
}
