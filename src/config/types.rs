// Configuration types module
// Settings deserialized from defaults and DIRSERVE_* environment variables

use crate::logger::AccessLogFormat;
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Listen address used when none is given on the command line
    pub listen: String,
    /// Tokio worker threads, defaults to the number of CPU cores
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit an access log entry per request, in addition to the decision line
    pub access_log: bool,
    #[serde(default)]
    pub access_log_format: AccessLogFormat,
    /// Append info and access lines here instead of stdout
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Append error lines here instead of stderr
    #[serde(default)]
    pub error_log_file: Option<String>,
}
