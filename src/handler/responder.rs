//! Content responder module
//!
//! Decides between a directory listing, file content and an error page for a
//! resolved URI, then builds the response.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::resolver::{self, INDEX_URI};
use crate::handler::router::RequestContext;
use crate::http::body;
use crate::http::cache::{self, Precondition, Validators};
use crate::http::mime::{self, SNIFF_LEN};
use crate::http::multipart::Multipart;
use crate::http::range::RangeParseResult;
use crate::http::{self, ResponseBody};
use crate::logger;
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt, TryStreamExt};
use hyper::Response;
use std::io::{self, Cursor, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Filesystem status of the resolved path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    File,
    Directory,
    /// Missing, or the status check itself failed
    Missing,
}

/// What to send for a resolved URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<'a> {
    NotFound,
    /// List the directory at this URI
    Listing(&'a str),
    Content,
}

/// The decision procedure, checked in order:
///
/// 1. missing and not the implicit index: 404
/// 2. `/index.html` that exists: content
/// 3. any other `.../index.html`, or a directory: listing of the containing directory
/// 4. otherwise: content
pub fn decide(uri: &str, status: FileStatus) -> Outcome<'_> {
    let found = status != FileStatus::Missing;
    if !found && uri != INDEX_URI {
        return Outcome::NotFound;
    }
    if found && uri == INDEX_URI {
        return Outcome::Content;
    }
    if let Some(dir) = uri.strip_suffix("index.html").filter(|dir| dir.ends_with('/')) {
        return Outcome::Listing(dir);
    }
    if status == FileStatus::Directory {
        return Outcome::Listing(uri);
    }
    Outcome::Content
}

/// Resolve the request path and respond to it
pub async fn respond(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    let uri = resolver::resolve(ctx.path);
    let target = state.target_path(&uri);
    let status = file_status(&target).await;

    match decide(&uri, status) {
        Outcome::NotFound => {
            logger::log_not_found(state.log(), &uri);
            http::build_404_response()
        }
        Outcome::Listing(dir) => {
            logger::log_serving_listing(state.log(), ctx.path);
            let listing = listing::render_listing(&state.target_path(dir), ctx.path).await;
            if listing.truncated {
                logger::log_listing_truncated(state.log(), ctx.path, listing.entries);
            }
            http::build_html_response(listing.html)
        }
        Outcome::Content => serve_content(ctx, state, &uri, target).await,
    }
}

async fn file_status(path: &Path) -> FileStatus {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => FileStatus::Directory,
        Ok(_) => FileStatus::File,
        Err(_) => FileStatus::Missing,
    }
}

async fn serve_content(
    ctx: &RequestContext<'_>,
    state: &AppState,
    uri: &str,
    target: PathBuf,
) -> Response<ResponseBody> {
    let file = match File::open(&target).await {
        Ok(file) => file,
        Err(e) => {
            logger::log_open_failed(state.log(), uri, &e);
            return http::build_500_response();
        }
    };

    logger::log_serving_content(state.log(), uri);
    match build_file_response(ctx, file, target).await {
        Ok(response) => response,
        Err(e) => {
            logger::log_error(state.log(), &format!("Failed to read '{uri}': {e}"));
            http::build_500_response()
        }
    }
}

/// Conditional and range handling for an open file
///
/// The last-modified time is pinned to the Unix epoch, whatever the file's mtime.
/// The body streams from the file; nothing but the sniffed prefix is read here.
async fn build_file_response(
    ctx: &RequestContext<'_>,
    mut file: File,
    target: PathBuf,
) -> io::Result<Response<ResponseBody>> {
    let metadata = file.metadata().await?;
    let size = metadata.len();
    let etag = cache::generate_etag(&metadata);
    let validators = Validators {
        etag: &etag,
        last_modified: DateTime::<Utc>::UNIX_EPOCH,
    };

    match ctx.preconditions().evaluate(&validators) {
        Precondition::Failed => return Ok(http::build_412_response()),
        Precondition::NotModified => return Ok(http::build_304_response(&validators)),
        Precondition::Proceed => {}
    }

    let content_type = match mime::content_type_for(&target) {
        Some(content_type) => content_type,
        None => sniff(&mut file).await?,
    };

    let range_header = ctx
        .range_header
        .as_deref()
        .filter(|_| cache::if_range_allows(ctx.if_range.as_deref(), &validators));

    let response = match http::parse_range_header(range_header, size) {
        RangeParseResult::Ignored => http::build_content_response(
            body::reader(file.take(size)),
            size,
            content_type,
            &validators,
        ),
        RangeParseResult::NotSatisfiable => http::build_416_response(size),
        RangeParseResult::Satisfiable(ranges) => match ranges.as_slice() {
            [range] => {
                file.seek(SeekFrom::Start(range.start)).await?;
                let content = body::reader(file.take(range.content_length()));
                http::build_partial_response(content, content_type, &validators, *range, size)
            }
            _ => {
                let multipart = Multipart::new(&ranges, content_type, size);
                let content = multipart_body(target, &multipart);
                http::build_multipart_response(content, &multipart, &validators)
            }
        },
    };
    Ok(response)
}

/// Read the first bytes to guess the type, then rewind
async fn sniff(file: &mut File) -> io::Result<&'static str> {
    let mut head = Vec::with_capacity(SNIFF_LEN);
    (&mut *file).take(SNIFF_LEN as u64).read_to_end(&mut head).await?;
    file.seek(SeekFrom::Start(0)).await?;
    Ok(mime::sniff_content_type(&head))
}

/// Stream each part's framing and bytes, opening the file per part as it is reached
fn multipart_body(target: PathBuf, multipart: &Multipart) -> ResponseBody {
    let closing = multipart.closing();
    let parts = stream::iter(multipart.parts().to_vec())
        .then(move |part| {
            let target = target.clone();
            async move {
                let mut file = File::open(&target).await?;
                file.seek(SeekFrom::Start(part.range.start)).await?;
                let segment = Cursor::new(part.header).chain(file.take(part.range.content_length()));
                Ok::<_, io::Error>(ReaderStream::new(segment))
            }
        })
        .try_flatten();
    body::stream(parts.chain(stream::once(async move { Ok(closing) })))
}
