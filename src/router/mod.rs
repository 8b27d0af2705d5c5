//! Request routing.
//!
//! A [`Router`] maps an exact `(method, path)` pair to a [`Handler`]. For each
//! request it strips the base path, decodes the query string and, once a
//! route matches, decodes the body by content type before calling the handler
//! with a fresh [`RequestContext`].

mod body;
mod dispatch;
mod error;
mod handler;
mod multipart;
mod query;
mod script;
mod table;
mod target;

// Re-export public items
pub use body::{boundary, decode_body, try_decode_body, BodyKind, DecodedBody};
pub use dispatch::Router;
pub use error::BodyError;
pub use handler::{Handler, HandlerFn, HandlerFuture, RequestContext};
pub use query::{parse_pairs, parse_query};
pub use table::RouteTable;
pub use target::{normalize_path, sanitize_target, split_target, strip_base_path};
