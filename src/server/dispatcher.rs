//! The dispatcher: middleware chain plus route table.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error};

use crate::middleware::{Middleware, MiddlewareChain};
use crate::parser::{HttpRequest, Method};
use crate::routing::{PatternError, Route};
use crate::server::blueprint::Blueprint;
use crate::server::handler::{handler_fn, panic_message, ErrorFn, HandlerFn, NotFoundFn};
use crate::server::{Error, HttpResponse, StatusCode};

/// Owns the route table and middleware chain and runs the request lifecycle.
///
/// Registration methods take `&mut self` and [`Dispatcher::handle`] takes
/// `&self`, so all registration is finished before the dispatcher is shared
/// between tasks. Nothing is mutated while handling a request.
///
/// # Example
///
/// ```
/// use microroute_rs::{Dispatcher, HttpRequest, HttpResponse, Method, StatusCode};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut app = Dispatcher::new();
/// app.get("/users/<id>", |req: HttpRequest| async move {
///     let id = req.param("id").unwrap_or_default().to_string();
///     Ok(HttpResponse::new(StatusCode::Ok).with_body_string(format!("user:{id}")))
/// })
/// .unwrap();
///
/// let response = app.handle(HttpRequest::new(Method::GET, "/users/42")).await;
/// assert_eq!(response.status, StatusCode::Ok);
/// assert_eq!(response.body_str(), Some("user:42"));
/// # });
/// ```
#[derive(Clone, Default)]
pub struct Dispatcher {
    routes: Vec<Route>,
    middleware: MiddlewareChain,
    not_found: Option<NotFoundFn>,
    error_handler: Option<ErrorFn>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async handler for `path`.
    ///
    /// An empty `methods` slice registers the route for `GET` only.
    pub fn add_route<F, Fut>(&mut self, path: &str, methods: &[Method], handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_handler(path, methods, handler_fn(handler))
    }

    /// Register an already boxed handler.
    pub fn add_handler(&mut self, path: &str, methods: &[Method], handler: HandlerFn) -> Result<&mut Self, PatternError> {
        let route = Route::new(path, methods, handler)?;
        self.routes.push(route);
        Ok(self)
    }

    pub fn get<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(path, &[Method::GET], handler)
    }

    pub fn post<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(path, &[Method::POST], handler)
    }

    pub fn put<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(path, &[Method::PUT], handler)
    }

    pub fn delete<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(path, &[Method::DELETE], handler)
    }

    pub fn patch<F, Fut>(&mut self, path: &str, handler: F) -> Result<&mut Self, PatternError>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(path, &[Method::PATCH], handler)
    }

    /// Append a middleware; registration order is execution order.
    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middleware.add(middleware);
        self
    }

    /// Append a shared middleware.
    pub fn add_middleware_arc(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.add_arc(middleware);
        self
    }

    /// Add a blueprint's routes (under its prefix) and middleware.
    ///
    /// Every route is compiled before any is added, so a bad template leaves
    /// the dispatcher unchanged.
    pub fn register_blueprint(&mut self, blueprint: Blueprint) -> Result<&mut Self, PatternError> {
        let (routes, middleware) = blueprint.into_parts()?;
        self.routes.extend(routes);
        for mw in middleware {
            self.middleware.add_arc(mw);
        }
        Ok(self)
    }

    /// Replace the default 404 response for paths no route matches.
    pub fn set_not_found_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(handler));
        self
    }

    /// Replace the default 500 response for internal failures.
    ///
    /// Used when a handler fails or panics and when middleware fails in
    /// either phase. A panic inside it falls back to the default 500.
    pub fn set_error_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&HttpRequest, &Error) -> HttpResponse + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Registered routes, in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    /// Run one request through the full lifecycle.
    ///
    /// 1. Request phase of the middleware chain. A response there skips
    ///    routing; a failure there returns 500 straight away.
    /// 2. Otherwise the route table is consulted.
    /// 3. Response phase of the middleware chain. A failure there returns the
    ///    response as it stood, with status 500, or the error handler's
    ///    response if one is installed.
    pub async fn handle(&self, mut request: HttpRequest) -> HttpResponse {
        let response = match self.middleware.run_request_phase(&request) {
            Ok(Some(response)) => response,
            Ok(None) => self.route(&mut request).await,
            Err(e) => return self.internal_error(&request, &e),
        };

        match self.middleware.run_response_phase(&request, response) {
            Ok(response) => response,
            Err(failure) if self.error_handler.is_some() => self.internal_error(&request, &failure.error),
            Err(failure) => failure.response.with_status(StatusCode::InternalServerError),
        }
    }

    /// Pick the first route whose pattern matches and whose methods allow the
    /// request, and run it with the captures from that single match.
    async fn route(&self, request: &mut HttpRequest) -> HttpResponse {
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.pattern().matches(&request.path) else {
                continue;
            };
            if route.allows(request.method) {
                return match route.run(request, params).await {
                    Ok(response) => response,
                    Err(e) => self.internal_error(request, &e),
                };
            }
            for method in route.methods() {
                if !allowed.contains(method) {
                    allowed.push(*method);
                }
            }
        }

        if allowed.is_empty() {
            debug!("No route for {} {}", request.method, request.path);
            return self.not_found(request);
        }

        let err = Error::MethodNotAllowed(request.method, request.path.clone());
        debug!("{err}");
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        HttpResponse::from_error(&err).with_header("Allow", allow)
    }

    fn not_found(&self, request: &HttpRequest) -> HttpResponse {
        let Some(handler) = &self.not_found else {
            return HttpResponse::not_found();
        };

        panic::catch_unwind(AssertUnwindSafe(|| handler(request))).unwrap_or_else(|payload| {
            error!("Not-found handler panicked: {}", panic_message(payload));
            HttpResponse::internal_error()
        })
    }

    fn internal_error(&self, request: &HttpRequest, error: &Error) -> HttpResponse {
        let Some(handler) = &self.error_handler else {
            return HttpResponse::internal_error();
        };

        panic::catch_unwind(AssertUnwindSafe(|| handler(request, error))).unwrap_or_else(|payload| {
            error!("Error handler panicked: {}", panic_message(payload));
            HttpResponse::internal_error()
        })
    }
}
