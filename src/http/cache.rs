//! HTTP cache validation module
//!
//! Provides `ETag` generation, HTTP-date handling and conditional request
//! evaluation (RFC 7232).

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::fs::Metadata;
use std::hash::{Hash, Hasher};

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// Obsolete RFC 850 date, e.g. `Sunday, 06-Nov-94 08:49:37 GMT`
const RFC850_DATE: &str = "%A, %d-%b-%y %H:%M:%S GMT";
/// ANSI C `asctime()` date, e.g. `Sun Nov  6 08:49:37 1994`
const ASCTIME_DATE: &str = "%a %b %e %H:%M:%S %Y";

/// Generate a strong `ETag` from file metadata
///
/// Size, modification time and (on unix) device and inode go into the tag, so
/// rewriting or replacing the file changes it without reading the content.
///
/// # Returns
/// Quoted `ETag` string, e.g., `"1f4-abc123def"`
pub fn generate_etag(metadata: &Metadata) -> String {
    let mut hasher = DefaultHasher::new();
    metadata.len().hash(&mut hasher);
    if let Ok(modified) = metadata.modified() {
        modified.hash(&mut hasher);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        metadata.dev().hash(&mut hasher);
        metadata.ino().hash(&mut hasher);
    }
    format!("\"{:x}-{:x}\"", metadata.len(), hasher.finish())
}

/// Format a timestamp as an HTTP-date (IMF-fixdate)
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(IMF_FIXDATE).to_string()
}

/// Parse any of the three HTTP-date formats clients may send
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    [IMF_FIXDATE, RFC850_DATE, ASCTIME_DATE]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Validators describing the representation being served
#[derive(Debug, Clone, Copy)]
pub struct Validators<'a> {
    pub etag: &'a str,
    pub last_modified: DateTime<Utc>,
}

impl Validators<'_> {
    pub fn last_modified_header(&self) -> String {
        format_http_date(self.last_modified)
    }

    /// `false` for the epoch, which stands for "modification time unknown"
    fn has_modification_time(&self) -> bool {
        self.last_modified != DateTime::<Utc>::UNIX_EPOCH
    }

    /// `true` when the representation changed after `since`, at one-second resolution
    fn modified_after(&self, since: DateTime<Utc>) -> bool {
        self.last_modified.timestamp() > since.timestamp()
    }

    /// Parse a date precondition, skipping it when there is nothing to compare against
    fn comparable_date(&self, header: Option<&str>) -> Option<DateTime<Utc>> {
        header
            .filter(|_| self.has_modification_time())
            .and_then(parse_http_date)
    }
}

/// Outcome of evaluating the conditional request headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Serve the representation normally
    Proceed,
    /// Reply 304 Not Modified
    NotModified,
    /// Reply 412 Precondition Failed
    Failed,
}

/// Conditional request headers, as sent by the client
#[derive(Debug, Default, Clone, Copy)]
pub struct Preconditions<'a> {
    pub if_match: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub if_unmodified_since: Option<&'a str>,
}

impl Preconditions<'_> {
    /// Evaluate the preconditions for a GET or HEAD request
    ///
    /// Order follows RFC 7232 section 6: `If-Match`, else `If-Unmodified-Since`;
    /// then `If-None-Match`, else `If-Modified-Since`. Unparseable dates are ignored,
    /// and so are both date headers when the last-modified time is the epoch.
    pub fn evaluate(&self, validators: &Validators<'_>) -> Precondition {
        let write_guard_failed = match self.if_match {
            Some(header) => !etag_list_matches(header, validators.etag, Comparison::Strong),
            None => validators
                .comparable_date(self.if_unmodified_since)
                .is_some_and(|since| validators.modified_after(since)),
        };
        if write_guard_failed {
            return Precondition::Failed;
        }

        match self.if_none_match {
            Some(header) if etag_list_matches(header, validators.etag, Comparison::Weak) => {
                Precondition::NotModified
            }
            Some(_) => Precondition::Proceed,
            None => {
                let not_modified = validators
                    .comparable_date(self.if_modified_since)
                    .is_some_and(|since| !validators.modified_after(since));
                if not_modified {
                    Precondition::NotModified
                } else {
                    Precondition::Proceed
                }
            }
        }
    }
}

/// Check whether an `If-Range` header still allows a partial response
///
/// An entity tag must match strongly; a date must equal the last-modified time.
pub fn if_range_allows(if_range: Option<&str>, validators: &Validators<'_>) -> bool {
    let Some(value) = if_range.map(str::trim) else {
        return true;
    };
    if value.starts_with('"') || value.starts_with("W/") {
        return strong_match(value, validators.etag);
    }
    parse_http_date(value)
        .is_some_and(|date| date.timestamp() == validators.last_modified.timestamp())
}

#[derive(Debug, Clone, Copy)]
enum Comparison {
    Strong,
    Weak,
}

/// Match an `ETag` against a comma-separated list (or `*`)
fn etag_list_matches(header: &str, etag: &str, comparison: Comparison) -> bool {
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*"
            || match comparison {
                Comparison::Strong => strong_match(candidate, etag),
                Comparison::Weak => weak_match(candidate, etag),
            }
    })
}

fn strong_match(a: &str, b: &str) -> bool {
    !a.starts_with("W/") && !b.starts_with("W/") && a == b
}

fn weak_match(a: &str, b: &str) -> bool {
    a.trim_start_matches("W/") == b.trim_start_matches("W/")
}
