//! Request handler module
//!
//! One catch-all handler: the path resolver normalizes the request path, the
//! responder turns it into a listing, file content or an error page.

pub mod listing;
pub mod resolver;
pub mod responder;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
