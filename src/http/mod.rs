//! HTTP protocol layer module
//!
//! Response bodies and builders, conditional request handling, range parsing
//! and MIME detection, independent of how paths are resolved.

pub mod body;
pub mod cache;
pub mod mime;
pub mod multipart;
pub mod range;
pub mod response;

pub use body::ResponseBody;
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_400_response, build_404_response, build_405_response,
    build_412_response, build_416_response, build_500_response, build_content_response,
    build_html_response, build_multipart_response, build_options_response,
    build_partial_response,
};
