// Server module entry point
// Binds the listener and accepts connections until the process is killed

pub mod connection;
pub mod listener;

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use listener::create_listener;

/// Accept loop: every connection is served on its own task.
///
/// Accept errors are logged and the loop keeps going.
pub async fn run(listener: TcpListener, state: Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                connection::spawn_connection(stream, peer_addr, Arc::clone(&state));
            }
            Err(e) => {
                logger::log_error(state.log(), &format!("Failed to accept connection: {e}"));
            }
        }
    }
}
