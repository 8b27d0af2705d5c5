//! HTTP server implementation for microroute.
//!
//! This module provides the response types, the error taxonomy shared with
//! handlers, and a tokio TCP server that parses each request and hands it to
//! a [`Router`](crate::Router).

mod response;
mod config;
mod error;
mod http_server;
mod tests;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use http_server::HttpServer;
