//! HTTP parser module.
//!
//! Turns raw HTTP/1.x bytes into an [`HttpRequest`] the router can dispatch:
//! method, raw request target, headers and body.

mod request;
mod method;
mod version;
mod error;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

// Re-export the parsing functions
pub use request::{find_head_end, parse_head, parse_request};
