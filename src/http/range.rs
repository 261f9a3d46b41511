//! HTTP Range request parsing module
//!
//! `bytes` ranges (RFC 7233), one or several per request.

/// A satisfiable byte range, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub const fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` header
    pub fn content_range(&self, total_size: u64) -> String {
        format!("bytes {}-{}/{total_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Serve 206 with these ranges, in request order
    Satisfiable(Vec<ByteRange>),
    /// Serve 416
    NotSatisfiable,
    /// No usable Range header, serve the full content
    Ignored,
}

enum RangeSpec {
    Range(ByteRange),
    /// Well-formed but entirely past the end of the representation
    NoOverlap,
}

/// Parse an HTTP `Range` header against a representation of `size` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-` and `bytes=-suffix`,
/// comma-separated. A malformed header, or one where no range overlaps the
/// content, is not satisfiable. Ranges adding up to more than the whole
/// representation are ignored.
pub fn parse_range_header(range_header: Option<&str>, size: u64) -> RangeParseResult {
    let Some(header) = range_header.map(str::trim).filter(|h| !h.is_empty()) else {
        return RangeParseResult::Ignored;
    };
    let Some(specs) = header.strip_prefix("bytes=") else {
        return RangeParseResult::NotSatisfiable;
    };

    let mut ranges = Vec::new();
    let mut no_overlap = false;
    for spec in specs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match parse_range_spec(spec, size) {
            Some(RangeSpec::Range(range)) => ranges.push(range),
            Some(RangeSpec::NoOverlap) => no_overlap = true,
            None => return RangeParseResult::NotSatisfiable,
        }
    }

    if ranges.is_empty() {
        return if no_overlap {
            RangeParseResult::NotSatisfiable
        } else {
            RangeParseResult::Ignored
        };
    }
    let requested: u64 = ranges.iter().map(ByteRange::content_length).sum();
    if requested > size {
        return RangeParseResult::Ignored;
    }
    RangeParseResult::Satisfiable(ranges)
}

/// `None` means the byte-range-spec is malformed
fn parse_range_spec(spec: &str, size: u64) -> Option<RangeSpec> {
    let (first, last) = spec.split_once('-')?;
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        // "-500": the final 500 bytes
        if last.starts_with(['-', '+']) {
            return None;
        }
        let suffix = last.parse::<u64>().ok()?;
        if suffix == 0 || size == 0 {
            return Some(RangeSpec::NoOverlap);
        }
        return Some(RangeSpec::Range(ByteRange {
            start: size - suffix.min(size),
            end: size - 1,
        }));
    }

    let start = first.parse::<u64>().ok()?;
    if start >= size {
        return Some(RangeSpec::NoOverlap);
    }
    let end = if last.is_empty() {
        size - 1
    } else {
        let end = last.parse::<u64>().ok()?;
        if end < start {
            return None;
        }
        end.min(size - 1)
    };
    Some(RangeSpec::Range(ByteRange { start, end }))
}
