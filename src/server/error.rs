//! Error types for dispatch and the server.

use thiserror::Error;

use crate::parser::{Error as ParserError, Method};
use crate::routing::PatternError;
use crate::server::response::StatusCode;

/// Errors that can occur while dispatching or serving requests.
///
/// Handlers and middleware return this type. Whatever they return, the
/// dispatcher turns it into a response; none of these reach the transport
/// except [`Error::ParseError`], [`Error::PayloadTooLarge`] and
/// [`Error::IoError`].
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A route template failed to compile.
    #[error("Invalid route pattern: {0}")]
    Pattern(#[from] PatternError),

    /// Requested resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Method not allowed for the requested resource.
    #[error("Method {0} not allowed for path: {1}")]
    MethodNotAllowed(Method, String),

    /// The request does not fit in the read buffer of this many bytes.
    #[error("Request exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// A handler or middleware hook panicked.
    #[error("Panicked: {0}")]
    Panic(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The status code a response for this error carries.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ParseError(_) => StatusCode::BadRequest,
            Error::NotFound(_) => StatusCode::NotFound,
            Error::MethodNotAllowed(_, _) => StatusCode::MethodNotAllowed,
            Error::PayloadTooLarge(_) => StatusCode::PayloadTooLarge,
            _ => StatusCode::InternalServerError,
        }
    }
}
