// Application state module
// Immutable per-process state shared by every request

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::types::Config;
use crate::logger::{AccessLogFormat, LogSink};

/// Application state
pub struct AppState {
    /// Serving root, the working directory at startup
    pub root: PathBuf,
    pub log: Arc<dyn LogSink>,
    /// Access log format, `None` when access logging is off
    pub access_log: Option<AccessLogFormat>,
}

impl AppState {
    pub fn new(root: PathBuf, log: Arc<dyn LogSink>, config: &Config) -> Self {
        Self {
            root,
            log,
            access_log: config
                .logging
                .access_log
                .then_some(config.logging.access_log_format),
        }
    }

    pub fn log(&self) -> &dyn LogSink {
        self.log.as_ref()
    }

    /// Join a cleaned request URI onto the serving root
    pub fn target_path(&self, uri: &str) -> PathBuf {
        join_under(&self.root, uri)
    }
}

fn join_under(root: &Path, uri: &str) -> PathBuf {
    let relative = uri.trim_start_matches('/');
    if relative.is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}
