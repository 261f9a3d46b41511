// Configuration module entry point
// Loads settings, parses the listen address and holds shared state

mod state;
mod types;

use std::collections::HashMap;
use std::net::{SocketAddr, ToSocketAddrs};

pub use state::AppState;
pub use types::Config;

/// Environment variable prefix, e.g. `DIRSERVE_LOGGING__ACCESS_LOG=true`
const ENV_PREFIX: &str = "DIRSERVE";
pub const DEFAULT_LISTEN: &str = ":8080";

impl Config {
    /// Load configuration from defaults and the process environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with_env(None)
    }

    /// Load configuration with an explicit environment map instead of the process environment
    pub fn load_with_env(env: Option<HashMap<String, String>>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_default("server.listen", DEFAULT_LISTEN)?
            .set_default("logging.access_log", false)?
            .set_default("logging.access_log_format", "common")?
            .build()?;

        settings.try_deserialize()
    }
}

/// Parse a `host:port` listen address
///
/// An empty host (`:8080`) listens on all IPv4 interfaces; host names are resolved
/// and the first address wins.
pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr, String> {
    let normalized = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    };

    normalized
        .to_socket_addrs()
        .map_err(|e| format!("Invalid listen address '{addr}': {e}"))?
        .next()
        .ok_or_else(|| format!("Listen address '{addr}' did not resolve"))
}
