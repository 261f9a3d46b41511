//! Response body module
//!
//! Every response carries the same boxed body type, so in-memory pages and
//! streamed files can come out of the same handler.

use futures_util::{Stream, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use std::io;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Body held in memory
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty() -> ResponseBody {
    full(Bytes::new())
}

/// Body produced chunk by chunk from a stream
pub fn stream<S>(chunks: S) -> ResponseBody
where
    S: Stream<Item = io::Result<Bytes>> + Send + 'static,
{
    StreamBody::new(chunks.map_ok(Frame::data)).boxed_unsync()
}

/// Body read lazily from an async reader, e.g. an open file
pub fn reader<R>(source: R) -> ResponseBody
where
    R: AsyncRead + Send + 'static,
{
    stream(ReaderStream::new(source))
}
