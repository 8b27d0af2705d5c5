//! Error types for the body decoder.

use thiserror::Error;

/// Reasons a request body could not be decoded.
///
/// These never reach the transport: the dispatcher turns them into an empty body.
#[derive(Debug, Error)]
pub enum BodyError {
    /// A multipart content type without a usable `boundary` parameter.
    #[error("multipart content type has no boundary")]
    MissingBoundary,

    /// The body was declared as JSON but is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// There is no decoded body to extract from.
    #[error("request body is empty")]
    Empty,
}
