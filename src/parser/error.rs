//! Request decoding errors.

use thiserror::Error;

/// Why raw bytes could not be turned into an [`HttpRequest`](crate::HttpRequest).
///
/// The transport answers all of these with `400 Bad Request`.
#[derive(Debug, Error)]
pub enum Error {
    /// Nothing but whitespace before the end of the head.
    #[error("Empty request")]
    EmptyRequest,

    /// The request line and headers are not valid UTF-8.
    #[error("Request head is not valid UTF-8")]
    InvalidUtf8,

    /// The request line is not `METHOD TARGET VERSION`.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    #[error("Unsupported HTTP method: {0}")]
    InvalidMethod(String),

    /// The target is not an origin-form path.
    #[error("Request target must start with '/': {0}")]
    InvalidPath(String),

    #[error("Unsupported HTTP version: {0}")]
    InvalidVersion(String),

    /// A header line has no `:` separator or an empty name.
    #[error("Invalid header line: {0}")]
    InvalidHeaderFormat(String),

    /// A header the protocol version requires, such as `Host` for HTTP/1.1.
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// The body could not be decoded as the requested JSON type.
    #[error("Body is not valid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
