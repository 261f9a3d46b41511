//! `multipart/byteranges` layout (RFC 7233 appendix A)
//!
//! Only the framing lives here; the part payloads are read from the file by the
//! caller, so the whole body is never held in memory.

use crate::http::range::ByteRange;
use hyper::body::Bytes;
use rand::Rng;
use std::fmt::Write as _;

/// One body part: its framing followed by the bytes of `range`
#[derive(Debug, Clone)]
pub struct Part {
    pub header: Bytes,
    pub range: ByteRange,
}

#[derive(Debug)]
pub struct Multipart {
    boundary: String,
    parts: Vec<Part>,
    closing: Bytes,
}

impl Multipart {
    pub fn new(ranges: &[ByteRange], content_type: &str, total_size: u64) -> Self {
        Self::with_boundary(random_boundary(), ranges, content_type, total_size)
    }

    fn with_boundary(
        boundary: String,
        ranges: &[ByteRange],
        content_type: &str,
        total_size: u64,
    ) -> Self {
        let parts = ranges
            .iter()
            .enumerate()
            .map(|(i, range)| {
                // every part after the first starts on a fresh line
                let lead = if i == 0 { "" } else { "\r\n" };
                let header = format!(
                    "{lead}--{boundary}\r\nContent-Range: {}\r\nContent-Type: {content_type}\r\n\r\n",
                    range.content_range(total_size)
                );
                Part {
                    header: Bytes::from(header),
                    range: *range,
                }
            })
            .collect();
        let closing = Bytes::from(format!("\r\n--{boundary}--\r\n"));
        Self {
            boundary,
            parts,
            closing,
        }
    }

    /// Value for the response `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/byteranges; boundary={}", self.boundary)
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn closing(&self) -> Bytes {
        self.closing.clone()
    }

    /// Exact body size, framing included
    pub fn content_length(&self) -> u64 {
        let parts: u64 = self
            .parts
            .iter()
            .map(|part| part.header.len() as u64 + part.range.content_length())
            .sum();
        parts + self.closing.len() as u64
    }
}

fn random_boundary() -> String {
    let bytes: [u8; 30] = rand::thread_rng().gen();
    bytes.iter().fold(String::with_capacity(60), |mut hex, b| {
        let _ = write!(hex, "{b:02x}");
        hex
    })
}
