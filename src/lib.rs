//! A minimal HTTP request-dispatch layer.
//!
//! This library resolves a decoded request to a handler through pattern-based
//! routing, runs it through an ordered middleware chain, and returns a
//! structured response. Failures in user code never escape: they become 500
//! responses.
//!
//! # Features
//!
//! - Path templates with named captures (`/users/<id>`), anchored and
//!   segment-by-segment
//! - Method filtering with 405 responses and an `Allow` header
//! - Middleware with short-circuiting request hooks and response hooks that
//!   run for every request, both in registration order
//! - Handler failure containment, including panics
//! - An injectable in-memory session registry with expiry
//! - A small TCP server and request parser to put it on the wire
//!
//! # Examples
//!
//! ## Routing
//!
//! ```
//! use microroute_rs::{Dispatcher, HttpRequest, HttpResponse, Method, StatusCode};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut app = Dispatcher::new();
//! app.get("/users/<id>", |req: HttpRequest| async move {
//!     let id = req.param("id").unwrap_or_default().to_string();
//!     Ok(HttpResponse::new(StatusCode::Ok).with_body_string(format!("user:{id}")))
//! })
//! .unwrap();
//!
//! let ok = app.handle(HttpRequest::new(Method::GET, "/users/42")).await;
//! assert_eq!(ok.body_str(), Some("user:42"));
//!
//! let wrong_method = app.handle(HttpRequest::new(Method::POST, "/users/42")).await;
//! assert_eq!(wrong_method.status, StatusCode::MethodNotAllowed);
//!
//! let missing = app.handle(HttpRequest::new(Method::GET, "/users")).await;
//! assert_eq!(missing.status, StatusCode::NotFound);
//! # });
//! ```
//!
//! ## Sessions
//!
//! ```
//! use microroute_rs::SessionRegistry;
//!
//! let sessions = SessionRegistry::new();
//! let id = sessions.create("alice");
//! assert_eq!(sessions.resolve(&id).as_deref(), Some("alice"));
//! assert!(sessions.invalidate(&id));
//! assert!(!sessions.invalidate(&id));
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use microroute_rs::{Dispatcher, HttpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new();
//! HttpServer::new(ServerConfig::from_env()?, dispatcher).start().await?;
//! # Ok(())
//! # }
//! ```

pub mod middleware;
pub mod parser;
pub mod routing;
pub mod server;
pub mod session;

// Re-export commonly used items for convenience
pub use middleware::{Middleware, MiddlewareChain, RequestLogger, ResponseHeaders, ResponsePhaseFailure};
pub use parser::{parse_request, Error as ParserError, Headers, HttpRequest, HttpVersion, Method};
pub use routing::{Params, PathPattern, PatternError, Route, Segment};
pub use server::{
    handler_fn, Blueprint, Dispatcher, Error as ServerError, ErrorFn, HandlerFn, HttpResponse, HttpServer, ServerConfig,
    StatusCode,
};
pub use session::{SessionRecord, SessionRegistry, DEFAULT_SESSION_TIMEOUT};
