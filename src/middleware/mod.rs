//! Request/response interception.
//!
//! Middleware see every request before routing and every response after it.
//! A request hook can answer the request itself, which stops the request
//! phase and skips routing. Response hooks then run for every registered
//! middleware, whatever produced the response.
//!
//! Both phases run in registration order. The response phase is *not*
//! reversed:
//!
//! ```text
//! request  → A.on_request → B.on_request → route
//! response → A.on_response → B.on_response → transport
//! ```
//!
//! # Example
//!
//! ```
//! use microroute_rs::{HttpRequest, HttpResponse, Middleware, ServerError, StatusCode};
//!
//! struct RequireApiKey;
//!
//! impl Middleware for RequireApiKey {
//!     fn name(&self) -> &'static str {
//!         "require-api-key"
//!     }
//!
//!     fn on_request(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, ServerError> {
//!         if request.has_header("X-Api-Key") {
//!             Ok(None)
//!         } else {
//!             Ok(Some(HttpResponse::from_status(StatusCode::Unauthorized)))
//!         }
//!     }
//! }
//! ```

mod chain;
mod headers;
mod logger;

pub use chain::{MiddlewareChain, ResponsePhaseFailure};
pub use headers::ResponseHeaders;
pub use logger::RequestLogger;

use crate::parser::HttpRequest;
use crate::server::{Error, HttpResponse};

/// An interceptor with a request hook and a response hook.
///
/// Both hooks default to no-ops. Returning `Err` (or panicking) from either
/// hook is treated as an internal failure of the request.
pub trait Middleware: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Inspect a request before routing.
    ///
    /// `Ok(Some(response))` answers the request and stops the request phase.
    fn on_request(&self, _request: &HttpRequest) -> Result<Option<HttpResponse>, Error> {
        Ok(None)
    }

    /// Inspect or replace the outgoing response.
    fn on_response(&self, _request: &HttpRequest, _response: &mut HttpResponse) -> Result<(), Error> {
        Ok(())
    }
}
