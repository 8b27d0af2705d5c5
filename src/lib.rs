//! A minimal exact-match HTTP router.
//!
//! Routes map a `(method, path)` pair to a handler. Dispatching a request
//! strips a configured base path, decodes the query string and the body
//! (multipart form, urlencoded form or JSON) and calls the handler once, or
//! answers 404 when nothing matches.
//!
//! # Features
//!
//! - Exact path matching with last-write-wins registration
//! - Query string and urlencoded form decoding, percent-escapes included
//! - `multipart/form-data` field extraction (file parts are skipped)
//! - JSON bodies with typed extraction through serde
//! - Async function handlers and CGI-style script handlers
//! - A small tokio HTTP/1.x server that shares one read-only router
//!
//! # Examples
//!
//! ## Dispatching a request
//!
//! ```
//! use std::collections::HashMap;
//! use microroute::{HttpRequest, HttpResponse, HttpVersion, Method, Router, StatusCode};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut router = Router::with_base_path("/api");
//! router.get("/hello", |ctx| async move {
//!     let name = ctx.param("name").unwrap_or("world").to_string();
//!     Ok(HttpResponse::text(StatusCode::Ok, format!("Hello, {name}!")))
//! });
//!
//! let request = HttpRequest::new(Method::GET, "/api/hello?name=Ada", HttpVersion::Http11, HashMap::new());
//! let response = router.dispatch(&request).await;
//! assert_eq!(response.status, StatusCode::Ok);
//! assert_eq!(response.body_text(), "Hello, Ada!");
//!
//! let missing = HttpRequest::new(Method::GET, "/api/nope", HttpVersion::Http11, HashMap::new());
//! assert_eq!(router.dispatch(&missing).await.status, StatusCode::NotFound);
//! # }
//! ```
//!
//! ## Decoding a body
//!
//! ```
//! use microroute::decode_body;
//!
//! let form = decode_body(Some("application/x-www-form-urlencoded"), b"name=Alice&age=30");
//! assert_eq!(form.get("name"), Some("Alice"));
//! assert_eq!(form.get("age"), Some("30"));
//!
//! // Undecodable bodies come back empty instead of failing the request
//! assert!(decode_body(Some("application/json"), b"{x:").is_empty());
//! ```
//!
//! See the `demos` directory for a complete server.

// Export the parser module
pub mod parser;

// Export the router module
pub mod router;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use router::{decode_body, BodyError, DecodedBody, Handler, RequestContext, RouteTable, Router};
pub use server::{Error as ServerError, HttpResponse, HttpServer, ServerConfig, StatusCode};
