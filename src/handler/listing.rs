//! Directory listing module
//!
//! Renders one directory level as an HTML table of names and sizes.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::fs::Metadata;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

const INDEX_FILE: &str = "index.html";

/// A rendered listing
#[derive(Debug)]
pub struct Listing {
    pub html: String,
    /// Rows emitted
    pub entries: usize,
    /// The walk stopped on an error; rows after it are missing
    pub truncated: bool,
}

impl Listing {
    fn open(heading: &str) -> Self {
        let html = format!(
            "<!doctype html>\n<head><title>Directory Listing</title></head>\n\
             <body><h2>{}</h2><div style=\"width: 100%\"><table style=\"width: 100%\">\
             <tr><th width=\"10%\"></th><th width=\"60%\"></th><th width=\"30%\"></th></tr>",
            escape_html(heading)
        );
        Self {
            html,
            entries: 0,
            truncated: false,
        }
    }

    fn push_row(&mut self, name: &str, is_dir: bool, size: u64) {
        let suffix = if is_dir { "/" } else { "" };
        let name = escape_html(name);
        let _ = write!(
            self.html,
            "<tr><td></td><td><a href=\"{name}{suffix}\">{name}{suffix}</a></td><td>{size} bytes</td></tr>"
        );
        self.entries += 1;
    }

    fn close(&mut self) {
        self.html.push_str("</table></div></body></html>");
    }
}

/// Render the immediate children of `dir`
///
/// `request_path` is only used for the heading. Entry names are visited in
/// lexical order and sized with `lstat`, so symlinks are not followed. The first
/// error stops the walk; the document is still closed and the rows so far kept.
pub async fn render_listing(dir: &Path, request_path: &str) -> Listing {
    render_listing_with(dir, request_path, fs::symlink_metadata).await
}

/// `render_listing` with the per-entry `lstat` supplied by the caller
async fn render_listing_with<F, Fut>(dir: &Path, request_path: &str, lstat: F) -> Listing
where
    F: FnMut(PathBuf) -> Fut,
    Fut: Future<Output = io::Result<Metadata>>,
{
    let mut listing = Listing::open(strip_index(request_path));
    if walk(dir, &mut listing, lstat).await.is_err() {
        listing.truncated = true;
    }
    listing.close();
    listing
}

async fn walk<F, Fut>(dir: &Path, listing: &mut Listing, mut lstat: F) -> io::Result<()>
where
    F: FnMut(PathBuf) -> Fut,
    Fut: Future<Output = io::Result<Metadata>>,
{
    for name in read_entry_names(dir).await? {
        let metadata = lstat(dir.join(&name)).await?;
        listing.push_row(&name.to_string_lossy(), metadata.is_dir(), metadata.len());
    }
    Ok(())
}

async fn read_entry_names(dir: &Path) -> io::Result<Vec<OsString>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}

/// Drop a trailing `index.html` from a request path
pub fn strip_index(path: &str) -> &str {
    path.strip_suffix(INDEX_FILE).unwrap_or(path)
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_immediate_children_only() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("b.txt"), "12345").unwrap();
        std::fs::write(root.path().join("a.txt"), "").unwrap();
        std::fs::create_dir_all(root.path().join("sub/deeper")).unwrap();
        std::fs::write(root.path().join("sub/nested.txt"), "x").unwrap();

        let listing = render_listing(root.path(), "/").await;

        assert!(!listing.truncated);
        assert_eq!(listing.entries, 3);
        assert!(listing.html.contains("<h2>/</h2>"));
        assert!(listing
            .html
            .contains("<a href=\"b.txt\">b.txt</a></td><td>5 bytes</td>"));
        assert!(listing.html.contains("<a href=\"a.txt\">a.txt</a></td><td>0 bytes</td>"));
        assert!(listing.html.contains("<a href=\"sub/\">sub/</a>"));
        assert!(!listing.html.contains("nested.txt"));
        assert!(!listing.html.contains("deeper"));
        assert!(listing.html.ends_with("</table></div></body></html>"));
    }

    #[tokio::test]
    async fn test_entries_in_lexical_order() {
        let root = tempfile::tempdir().unwrap();
        for name in ["zeta", "Alpha", "beta"] {
            std::fs::write(root.path().join(name), name).unwrap();
        }

        let html = render_listing(root.path(), "/").await.html;
        let position = |name: &str| html.find(&format!(">{name}<")).unwrap();
        assert!(position("Alpha") < position("beta"));
        assert!(position("beta") < position("zeta"));
    }

    #[tokio::test]
    async fn test_heading_strips_index_suffix() {
        let root = tempfile::tempdir().unwrap();
        let listing = render_listing(root.path(), "/docs/index.html").await;
        assert!(listing.html.contains("<h2>/docs/</h2>"));
        assert_eq!(listing.entries, 0);
    }

    #[tokio::test]
    async fn test_names_are_escaped() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a<b>&\"c\".txt"), "").unwrap();

        let html = render_listing(root.path(), "/").await.html;
        assert!(html.contains("a&lt;b&gt;&amp;&quot;c&quot;.txt"));
        assert!(!html.contains("a<b>"));
    }

    #[tokio::test]
    async fn test_failed_entry_keeps_earlier_rows() {
        let root = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
            std::fs::write(root.path().join(name), name).unwrap();
        }

        let mut looked_up = 0;
        let listing = render_listing_with(root.path(), "/", |path| {
            looked_up += 1;
            let fail = looked_up > 2;
            async move {
                if fail {
                    Err(io::Error::from(io::ErrorKind::PermissionDenied))
                } else {
                    fs::symlink_metadata(path).await
                }
            }
        })
        .await;

        assert!(listing.truncated);
        assert_eq!(listing.entries, 2);
        assert!(listing.html.contains("<a href=\"a.txt\">a.txt</a></td><td>5 bytes</td>"));
        assert!(listing.html.contains("<a href=\"b.txt\">b.txt</a>"));
        assert!(!listing.html.contains("c.txt"));
        assert!(!listing.html.contains("d.txt"));
        assert!(listing.html.ends_with("</table></div></body></html>"));
    }

    #[tokio::test]
    async fn test_unreadable_directory_yields_closed_empty_table() {
        let root = tempfile::tempdir().unwrap();
        let listing = render_listing(&root.path().join("gone"), "/gone/").await;

        assert!(listing.truncated);
        assert_eq!(listing.entries, 0);
        assert!(listing.html.starts_with("<!doctype html>"));
        assert!(listing.html.ends_with("</table></div></body></html>"));
    }
}
