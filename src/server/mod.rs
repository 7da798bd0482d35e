//! Dispatch and serving.
//!
//! [`Dispatcher`] is the in-process entry point: it owns the route table and
//! the middleware chain and turns every request into a response.
//! [`HttpServer`] is a thin TCP transport in front of it.

mod blueprint;
mod config;
mod dispatcher;
mod error;
pub(crate) mod handler;
mod http_server;
mod response;

pub use blueprint::Blueprint;
pub use config::ServerConfig;
pub use dispatcher::Dispatcher;
pub use error::Error;
pub use handler::{handler_fn, ErrorFn, HandlerFn, HandlerFuture, NotFoundFn};
pub use http_server::HttpServer;
pub use response::{HttpResponse, StatusCode};
