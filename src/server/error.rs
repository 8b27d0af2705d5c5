//! Error types for dispatching and serving requests.

use thiserror::Error;

use crate::parser::{Error as ParserError, Method};
use crate::router::BodyError;
use crate::server::response::{HttpResponse, StatusCode};

/// Errors a handler, the dispatcher, or a connection can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No handler is registered for the method and path.
    #[error("No route for {method} {path}")]
    RouteNotFound { method: Method, path: String },

    /// The declared body is larger than the server accepts.
    #[error("Request body of {length} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { length: usize, limit: usize },

    /// The decoded body could not be turned into what the handler asked for.
    #[error("Body error: {0}")]
    BodyError(#[from] BodyError),

    /// A script handler could not be run or exited unsuccessfully.
    #[error("Script error: {0}")]
    ScriptError(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// The status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ParseError(_) | Error::BodyError(_) => StatusCode::BadRequest,
            Error::RouteNotFound { .. } => StatusCode::NotFound,
            Error::PayloadTooLarge { .. } => StatusCode::PayloadTooLarge,
            Error::IoError(_) | Error::ScriptError(_) | Error::InternalError(_) | Error::JsonError(_) => {
                StatusCode::InternalServerError
            }
        }
    }

    /// Render the error as a plain-text response.
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse::new(self.status())
            .with_content_type("text/plain")
            .with_body_string(self.to_string())
    }
}
