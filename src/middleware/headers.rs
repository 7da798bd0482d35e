//! Response header injection.

use crate::middleware::Middleware;
use crate::parser::{Headers, HttpRequest};
use crate::server::{Error, HttpResponse};

/// Adds fixed headers to every response that does not already set them.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    headers: Headers,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header to inject.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl Middleware for ResponseHeaders {
    fn name(&self) -> &'static str {
        "response-headers"
    }

    fn on_response(&self, _request: &HttpRequest, response: &mut HttpResponse) -> Result<(), Error> {
        for (name, value) in self.headers.iter() {
            if !response.headers.contains(name) {
                response.headers.insert(name, value);
            }
        }
        Ok(())
    }
}
