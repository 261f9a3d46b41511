//! HTTP response building module
//!
//! Builders for every status the file server emits.

use crate::http::body::{self, ResponseBody};
use crate::http::cache::Validators;
use crate::http::multipart::Multipart;
use crate::http::range::ByteRange;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

const NOT_FOUND_PAGE: &str = "<html><h1><strong>404</strong></h1><h3>File Not Found</h3></html>";
const INTERNAL_ERROR_PAGE: &str =
    "<html><h1><strong>500</strong></h1><h3>Internal Server Error [File Permissions]</h3></html>";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build 400 Bad Request response
pub fn build_400_response() -> Response<ResponseBody> {
    build_text_response(400, "text/plain; charset=utf-8", "400 Bad Request")
}

/// Build 404 Not Found page
pub fn build_404_response() -> Response<ResponseBody> {
    build_text_response(404, HTML_CONTENT_TYPE, NOT_FOUND_PAGE)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(405)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Allow", ALLOWED_METHODS);
    finish(builder, body::full("405 Method Not Allowed"))
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(204)
        .header("Allow", ALLOWED_METHODS);
    finish(builder, body::empty())
}

/// Build 500 page for files that exist but cannot be read
pub fn build_500_response() -> Response<ResponseBody> {
    build_text_response(500, HTML_CONTENT_TYPE, INTERNAL_ERROR_PAGE)
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators<'_>) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(304)
        .header("ETag", validators.etag)
        .header("Last-Modified", validators.last_modified_header());
    finish(builder, body::empty())
}

/// Build 412 Precondition Failed response
pub fn build_412_response() -> Response<ResponseBody> {
    build_text_response(412, "text/plain; charset=utf-8", "412 Precondition Failed")
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(total_size: u64) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(416)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Range", format!("bytes */{total_size}"));
    finish(builder, body::full("416 Range Not Satisfiable"))
}

/// Build 200 HTML response (directory listings)
pub fn build_html_response(content: String) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(200)
        .header("Content-Type", HTML_CONTENT_TYPE)
        .header("Content-Length", content.len());
    finish(builder, body::full(content))
}

/// Build 200 response carrying a whole file
///
/// `content` must yield exactly `size` bytes.
pub fn build_content_response(
    content: ResponseBody,
    size: u64,
    content_type: &str,
    validators: &Validators<'_>,
) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", size)
        .header("Accept-Ranges", "bytes")
        .header("ETag", validators.etag)
        .header("Last-Modified", validators.last_modified_header());
    finish(builder, content)
}

/// Build 206 Partial Content response for a single range
pub fn build_partial_response(
    content: ResponseBody,
    content_type: &str,
    validators: &Validators<'_>,
    range: ByteRange,
    total_size: u64,
) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(206)
        .header("Content-Type", content_type)
        .header("Content-Length", range.content_length())
        .header("Content-Range", range.content_range(total_size))
        .header("Accept-Ranges", "bytes")
        .header("ETag", validators.etag)
        .header("Last-Modified", validators.last_modified_header());
    finish(builder, content)
}

/// Build 206 Partial Content response with a `multipart/byteranges` body
pub fn build_multipart_response(
    content: ResponseBody,
    multipart: &Multipart,
    validators: &Validators<'_>,
) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(206)
        .header("Content-Type", multipart.content_type())
        .header("Content-Length", multipart.content_length())
        .header("Accept-Ranges", "bytes")
        .header("ETag", validators.etag)
        .header("Last-Modified", validators.last_modified_header());
    finish(builder, content)
}

fn build_text_response(status: u16, content_type: &str, text: &'static str) -> Response<ResponseBody> {
    let builder = Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", text.len());
    finish(builder, body::full(text))
}

/// Attach the body, falling back to a bare 500 if a header was invalid
fn finish(builder: Builder, content: ResponseBody) -> Response<ResponseBody> {
    builder.body(content).unwrap_or_else(|e| {
        eprintln!("[ERROR] Failed to build response: {e}");
        let mut response = Response::new(body::empty());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;

    async fn body_string(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_error_pages() {
        let not_found = build_404_response();
        assert_eq!(not_found.status(), 404);
        assert!(body_string(not_found).await.contains("File Not Found"));

        let internal = build_500_response();
        assert_eq!(internal.status(), 500);
        assert!(body_string(internal).await.contains("Internal Server Error"));
    }

    #[test]
    fn test_partial_headers() {
        let validators = Validators {
            etag: "\"abc\"",
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
        };
        let response = build_partial_response(
            body::full("llo"),
            "text/plain",
            &validators,
            ByteRange { start: 2, end: 4 },
            5,
        );
        assert_eq!(response.status(), 206);
        assert_eq!(response.headers()["Content-Range"], "bytes 2-4/5");
        assert_eq!(response.headers()["Content-Length"], "3");
        assert_eq!(
            response.headers()["Last-Modified"],
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }

    #[test]
    fn test_multipart_headers() {
        let validators = Validators {
            etag: "\"abc\"",
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
        };
        let ranges = [ByteRange { start: 0, end: 1 }, ByteRange { start: 5, end: 6 }];
        let multipart = Multipart::new(&ranges, "text/plain", 10);
        let response = build_multipart_response(body::empty(), &multipart, &validators);
        assert_eq!(response.status(), 206);
        let content_type = response.headers()["Content-Type"].to_str().unwrap();
        assert!(content_type.starts_with("multipart/byteranges; boundary="));
        assert_eq!(
            response.headers()["Content-Length"],
            multipart.content_length().to_string().as_str()
        );
    }
}
