// Connection handling module
// Serves one accepted TCP connection on its own task

use hyper::body::Body as _;
use hyper::header::CONTENT_LENGTH;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::handler;
use crate::http::ResponseBody;
use crate::logger::{self, AccessLogEntry};

/// Serve a connection in a spawned task.
///
/// The connection uses HTTP/1.1 with keep-alive; each request goes to
/// `handler::handle_request`. Connection errors are logged and end the task.
pub fn spawn_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let service_state = Arc::clone(&state);

        let mut builder = http1::Builder::new();
        builder.keep_alive(true);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| serve_request(req, peer_addr, Arc::clone(&service_state))),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(state.log(), &err);
        }
    });
}

/// Run the handler and write the access log entry when enabled
async fn serve_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let entry = state
        .access_log
        .map(|format| (format, AccessLogEntry::from_request(&req, peer_addr)));

    let response = handler::handle_request(req, Arc::clone(&state)).await?;

    if let Some((format, mut entry)) = entry {
        let body_bytes = body_length(&response);
        entry.complete(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(state.log(), &entry, format);
    }
    Ok(response)
}

/// Bytes the body will carry: exact for in-memory bodies, `Content-Length` for streams
fn body_length(response: &Response<ResponseBody>) -> u64 {
    response.body().size_hint().exact().unwrap_or_else(|| {
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    })
}
