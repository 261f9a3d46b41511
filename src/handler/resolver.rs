//! Path resolution module
//!
//! Turns the request path into the URI used for filesystem lookups. Pure
//! string work, no I/O.

use percent_encoding::percent_decode_str;

/// URI that `/` is mapped to
pub const INDEX_URI: &str = "/index.html";

/// Map a request path to its normalized URI
///
/// `/` becomes `/index.html`; everything else is lexically cleaned.
pub fn resolve(raw: &str) -> String {
    if raw == "/" {
        INDEX_URI.to_string()
    } else {
        clean(raw)
    }
}

/// Lexically clean a path, always producing a rooted result
///
/// Repeated separators and `.` segments are dropped, `..` removes the previous
/// segment, and `..` at the root is discarded so the result never climbs above `/`.
/// A trailing separator is removed.
pub fn clean(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Percent-decode a URL path
///
/// Returns `None` when an escape is truncated or not hex. Decoded bytes that are
/// not UTF-8 are replaced rather than rejected, so such paths fall through to a
/// failed lookup.
pub fn percent_decode(raw: &str) -> Option<String> {
    if has_malformed_escape(raw) {
        return None;
    }
    Some(percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

fn has_malformed_escape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !matches!(
                (bytes.get(i + 1), bytes.get(i + 2)),
                (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_maps_to_index() {
        assert_eq!(resolve("/"), "/index.html");
        assert_eq!(resolve("/index.html"), "/index.html");
    }

    #[test]
    fn test_clean() {
        let cases = [
            ("/docs/", "/docs"),
            ("/docs//a.txt", "/docs/a.txt"),
            ("/./docs/./a.txt", "/docs/a.txt"),
            ("/docs/sub/../a.txt", "/docs/a.txt"),
            ("//", "/"),
            ("", "/"),
            ("/docs/..", "/"),
        ];
        for (raw, expected) in cases {
            assert_eq!(clean(raw), expected, "clean({raw:?})");
        }
    }

    #[test]
    fn test_traversal_stays_under_root() {
        assert_eq!(resolve("/../../etc/passwd"), "/etc/passwd");
        assert_eq!(resolve("/docs/../../../secret"), "/secret");
        assert_eq!(resolve("/.."), "/");
        for raw in ["/../..", "/a/../../b/../../..", "/..//../x/.."] {
            assert!(!resolve(raw).contains(".."), "{raw:?}");
        }
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("/a%20b.txt").as_deref(), Some("/a b.txt"));
        assert_eq!(percent_decode("/caf%C3%A9").as_deref(), Some("/café"));
        assert_eq!(percent_decode("/plain").as_deref(), Some("/plain"));
        // encoded traversal is decoded first, then cleaned away
        let decoded = percent_decode("/%2e%2e/%2e%2e/etc/passwd").unwrap();
        assert_eq!(resolve(&decoded), "/etc/passwd");
    }

    #[test]
    fn test_percent_decode_rejects_bad_escapes() {
        assert_eq!(percent_decode("/%zz"), None);
        assert_eq!(percent_decode("/trailing%2"), None);
        assert_eq!(percent_decode("/100%"), None);
    }

    #[test]
    fn test_percent_decode_keeps_non_utf8_paths() {
        let decoded = percent_decode("/%ff.txt").unwrap();
        assert_eq!(decoded, "/\u{fffd}.txt");
        assert_eq!(resolve(&decoded), "/\u{fffd}.txt");
    }
}
