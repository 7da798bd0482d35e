//! Ordered middleware chain.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error};

use crate::middleware::Middleware;
use crate::parser::HttpRequest;
use crate::server::handler::panic_message;
use crate::server::{Error, HttpResponse};

/// A response hook failed part way through the response phase.
#[derive(Debug)]
pub struct ResponsePhaseFailure {
    /// Name of the middleware whose hook failed.
    pub middleware: &'static str,
    /// The response as it stood when the hook failed.
    pub response: HttpResponse,
    /// What went wrong.
    pub error: Error,
}

/// Middleware in registration order.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Create a new empty middleware chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware to the chain.
    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Append a shared middleware to the chain.
    pub fn add_arc(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Middleware names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Run request hooks until one answers.
    ///
    /// Returns `Ok(None)` when every hook passed the request on. The first
    /// failing hook stops the phase and its error is returned.
    pub fn run_request_phase(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, Error> {
        for mw in &self.middlewares {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| mw.on_request(request)))
                .unwrap_or_else(|payload| Err(Error::Panic(panic_message(payload))));

            match outcome {
                Ok(None) => {}
                Ok(Some(response)) => {
                    debug!(
                        "Middleware {name} short-circuited {method} {path} with {status}",
                        name = mw.name(),
                        method = request.method,
                        path = request.path,
                        status = response.status.as_u16(),
                    );
                    return Ok(Some(response));
                }
                Err(e) => {
                    error!("Middleware {name} failed in request phase: {e}", name = mw.name());
                    return Err(e);
                }
            }
        }
        Ok(None)
    }

    /// Give every response hook a turn, in registration order.
    ///
    /// The first failing hook stops the phase; the failure carries the
    /// response as it stood at that point.
    pub fn run_response_phase(
        &self,
        request: &HttpRequest,
        mut response: HttpResponse,
    ) -> Result<HttpResponse, ResponsePhaseFailure> {
        for mw in &self.middlewares {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| mw.on_response(request, &mut response)))
                .unwrap_or_else(|payload| Err(Error::Panic(panic_message(payload))));

            if let Err(e) = outcome {
                error!("Middleware {name} failed in response phase: {e}", name = mw.name());
                return Err(ResponsePhaseFailure {
                    middleware: mw.name(),
                    response,
                    error: e,
                });
            }
        }
        Ok(response)
    }
}
