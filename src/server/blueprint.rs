//! Named groups of routes registered together.

use std::future::Future;
use std::sync::Arc;

use crate::middleware::Middleware;
use crate::parser::{HttpRequest, Method};
use crate::routing::{PatternError, Route};
use crate::server::handler::{handler_fn, HandlerFn};
use crate::server::{Error, HttpResponse};

/// A named set of routes and middleware, optionally under a path prefix.
///
/// Templates are only compiled when the blueprint is registered with
/// [`Dispatcher::register_blueprint`](crate::Dispatcher::register_blueprint).
/// Its middleware joins the dispatcher's global chain at that point.
pub struct Blueprint {
    name: String,
    prefix: String,
    routes: Vec<(String, Vec<Method>, HandlerFn)>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: String::new(),
            routes: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Mount every route under `prefix`, e.g. `/api`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of routes in the blueprint.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Add a route relative to the prefix. An empty `methods` slice means `GET`.
    pub fn add_route<F, Fut>(&mut self, path: &str, methods: &[Method], handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.routes
            .push((path.to_string(), methods.to_vec(), handler_fn(handler)));
        self
    }

    pub fn add_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// The full template for a route path.
    ///
    /// `/` under a prefix maps to the prefix itself. Paths without a leading
    /// `/` are left alone so they fail to compile.
    pub fn full_path(&self, path: &str) -> String {
        if self.prefix.is_empty() || !path.starts_with('/') {
            return path.to_string();
        }
        if path == "/" {
            return self.prefix.clone();
        }
        format!("{}{}", self.prefix, path)
    }

    /// Compile all routes, failing on the first bad template.
    pub(crate) fn into_parts(self) -> Result<(Vec<Route>, Vec<Arc<dyn Middleware>>), PatternError> {
        let routes = self
            .routes
            .iter()
            .map(|(path, methods, handler)| Route::new(&self.full_path(path), methods, Arc::clone(handler)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((routes, self.middleware))
    }
}
