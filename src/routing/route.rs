//! A single route: pattern, allowed methods and handler.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use log::{debug, error};

use crate::parser::{HttpRequest, Method};
use crate::routing::error::PatternError;
use crate::routing::pattern::PathPattern;
use crate::routing::Params;
use crate::server::handler::{panic_message, HandlerFn};
use crate::server::{Error, HttpResponse};

/// Binds a compiled path pattern and a method set to a handler.
///
/// Routes are immutable once built.
#[derive(Clone)]
pub struct Route {
    pattern: PathPattern,
    methods: Vec<Method>,
    handler: HandlerFn,
}

impl Route {
    /// Build a route from a template.
    ///
    /// An empty method list means `[GET]`. Duplicate methods are dropped,
    /// keeping the first occurrence.
    pub fn new(template: &str, methods: &[Method], handler: HandlerFn) -> Result<Self, PatternError> {
        let pattern = PathPattern::compile(template)?;

        let mut allowed = Vec::with_capacity(methods.len().max(1));
        for method in methods {
            if !allowed.contains(method) {
                allowed.push(*method);
            }
        }
        if allowed.is_empty() {
            allowed.push(Method::GET);
        }

        Ok(Self {
            pattern,
            methods: allowed,
            handler,
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// The template the route was registered with.
    pub fn path(&self) -> &str {
        self.pattern.template()
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Whether `method` is in this route's allowed set.
    pub fn allows(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    /// Run the request through this route.
    ///
    /// The method is checked before the path. On a match the captures replace
    /// `request.params` and the handler runs with a copy of the updated
    /// request. Handler errors and panics become a 500 response and never
    /// escape this call.
    pub async fn dispatch(&self, request: &mut HttpRequest) -> HttpResponse {
        if !self.allows(request.method) {
            let err = Error::MethodNotAllowed(request.method, request.path.clone());
            debug!("{err}");
            return HttpResponse::from_error(&err);
        }

        let Some(params) = self.pattern.matches(&request.path) else {
            let err = Error::NotFound(request.path.clone());
            debug!("{err}");
            return HttpResponse::from_error(&err);
        };

        self.run(request, params)
            .await
            .unwrap_or_else(|_| HttpResponse::internal_error())
    }

    /// Bind already-matched `params` and run the handler on a copy of the
    /// request. An `Err` or a panic from the handler is logged and returned.
    pub(crate) async fn run(&self, request: &mut HttpRequest, params: Params) -> Result<HttpResponse, Error> {
        request.params = params;

        let handler = Arc::clone(&self.handler);
        let call = request.clone();
        let outcome = AssertUnwindSafe(async move { handler(call).await })
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(e)) => e,
            Err(payload) => Error::Panic(panic_message(payload)),
        };

        error!(
            "Handler for {method} {template} failed on {path}: {failure}",
            method = request.method,
            template = self.pattern,
            path = request.path,
        );
        Err(failure)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.pattern.template())
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}
