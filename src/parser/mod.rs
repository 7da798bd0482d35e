//! Request decoding.
//!
//! Turns raw bytes delivered by the transport into an [`HttpRequest`] that the
//! dispatcher can route. Only the request line, headers and body are decoded;
//! connection management stays with the server.

mod error;
mod headers;
mod protocol;
mod request;
mod tests;

pub use error::Error;
pub use headers::Headers;
pub use protocol::{HttpVersion, Method};
pub use request::{parse_request, HttpRequest};
pub(crate) use request::head_bounds;
