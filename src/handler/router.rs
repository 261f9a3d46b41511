//! Request entry module
//!
//! Every request goes through one handler: method check, path decoding, header
//! extraction, then resolve and respond.

use crate::config::AppState;
use crate::handler::{resolver, responder};
use crate::http::{self, body, cache::Preconditions, ResponseBody};
use crate::logger;
use hyper::header::HeaderMap;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Default)]
pub struct RequestContext<'a> {
    /// Percent-decoded request path
    pub path: &'a str,
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_unmodified_since: Option<String>,
    pub if_range: Option<String>,
    pub range_header: Option<String>,
}

impl<'a> RequestContext<'a> {
    fn from_headers(path: &'a str, headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            path,
            if_match: header("if-match"),
            if_none_match: header("if-none-match"),
            if_modified_since: header("if-modified-since"),
            if_unmodified_since: header("if-unmodified-since"),
            if_range: header("if-range"),
            range_header: header("range"),
        }
    }

    /// Context for a plain request without conditional or range headers
    #[cfg(test)]
    pub fn for_path(path: &'a str) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }

    pub fn preconditions(&self) -> Preconditions<'_> {
        Preconditions {
            if_match: self.if_match.as_deref(),
            if_none_match: self.if_none_match.as_deref(),
            if_modified_since: self.if_modified_since.as_deref(),
            if_unmodified_since: self.if_unmodified_since.as_deref(),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    let is_head = *req.method() == Method::HEAD;

    if let Some(resp) = check_http_method(req.method(), &state) {
        return Ok(resp);
    }

    let Some(path) = resolver::percent_decode(req.uri().path()) else {
        logger::log_warning(
            state.log(),
            &format!("Malformed request path: {}", req.uri().path()),
        );
        return Ok(http::build_400_response());
    };

    let ctx = RequestContext::from_headers(&path, req.headers());
    let response = responder::respond(&ctx, &state).await;

    Ok(if is_head {
        strip_body(response)
    } else {
        response
    })
}

/// Only GET and HEAD are served; OPTIONS is answered, anything else is 405
fn check_http_method(method: &Method, state: &AppState) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(state.log(), &format!("[405]: method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// HEAD keeps status and headers, including `Content-Length`, but sends no body
///
/// Dropping a streamed body closes its file without reading it.
fn strip_body(response: Response<ResponseBody>) -> Response<ResponseBody> {
    let (parts, _) = response.into_parts();
    Response::from_parts(parts, body::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logger::testing::MemorySink;
    use http_body_util::BodyExt;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn serve_dir() -> (TempDir, Arc<AppState>, Arc<MemorySink>) {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("index.html"), "hi").unwrap();
        std::fs::write(root.path().join("a b.txt"), "spaced").unwrap();
        let sink = Arc::new(MemorySink::default());
        let config = Config::load_with_env(Some(HashMap::new())).unwrap();
        let state = Arc::new(AppState::new(
            root.path().to_path_buf(),
            sink.clone(),
            &config,
        ));
        (root, state, sink)
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    async fn body_bytes(response: Response<ResponseBody>) -> hyper::body::Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_get_root() {
        let (_root, state, _sink) = serve_dir();
        let response = handle_request(request(Method::GET, "/"), state).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_bytes(response).await, "hi");
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let (_root, state, _sink) = serve_dir();
        let response = handle_request(request(Method::HEAD, "/index.html"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["Content-Length"], "2");
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let (_root, state, _sink) = serve_dir();
        let response = handle_request(request(Method::GET, "/a%20b.txt"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_bytes(response).await, "spaced");
    }

    #[tokio::test]
    async fn test_non_utf8_escape_is_404() {
        let (_root, state, sink) = serve_dir();
        let response = handle_request(request(Method::GET, "/%ff"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        assert!(sink.lines()[0].1.starts_with("[404]: file not found"));
    }

    #[tokio::test]
    async fn test_malformed_escape_is_400() {
        let (_root, state, sink) = serve_dir();
        let response = handle_request(request(Method::GET, "/%zz"), state)
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        assert!(sink.lines()[0].1.starts_with("[WARN] Malformed request path"));
    }

    #[tokio::test]
    async fn test_query_string_is_ignored() {
        let (_root, state, _sink) = serve_dir();
        let response = handle_request(request(Method::GET, "/index.html?v=2"), state)
            .await
            .unwrap();
        assert_eq!(body_bytes(response).await, "hi");
    }

    #[tokio::test]
    async fn test_method_checks() {
        let (_root, state, _sink) = serve_dir();

        let post = handle_request(request(Method::POST, "/"), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(post.status(), 405);
        assert_eq!(post.headers()["Allow"], "GET, HEAD, OPTIONS");

        let options = handle_request(request(Method::OPTIONS, "/"), state)
            .await
            .unwrap();
        assert_eq!(options.status(), 204);
    }

    #[tokio::test]
    async fn test_conditional_headers_are_honored() {
        let (_root, state, _sink) = serve_dir();
        let first = handle_request(request(Method::GET, "/index.html"), Arc::clone(&state))
            .await
            .unwrap();
        let etag = first.headers()["ETag"].clone();

        let revalidate = Request::builder()
            .uri("/index.html")
            .header("If-None-Match", etag)
            .body(())
            .unwrap();
        let response = handle_request(revalidate, state).await.unwrap();
        assert_eq!(response.status(), 304);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_range_header_is_honored() {
        let (_root, state, _sink) = serve_dir();
        let ranged = Request::builder()
            .uri("/a%20b.txt")
            .header("Range", "bytes=-2")
            .body(())
            .unwrap();
        let response = handle_request(ranged, state).await.unwrap();
        assert_eq!(response.status(), 206);
        assert_eq!(body_bytes(response).await, "ed");
    }
}
