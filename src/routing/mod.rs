//! Pattern-based routing.
//!
//! [`PathPattern`] compiles templates like `/users/<id>` and extracts named
//! segments; [`Route`] adds a method filter and a handler and contains any
//! handler failure.

mod error;
mod pattern;
mod route;
mod tests;

use std::collections::HashMap;

pub use error::PatternError;
pub use pattern::{PathPattern, Segment};
pub use route::Route;

/// Captured path segments, keyed by capture name.
pub type Params = HashMap<String, String>;
