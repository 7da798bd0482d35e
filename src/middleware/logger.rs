//! Request/response logging middleware.

use log::{debug, info};

use crate::middleware::Middleware;
use crate::parser::HttpRequest;
use crate::server::{Error, HttpResponse};

/// Logs each request on the way in and each response on the way out.
///
/// Bodies are logged at debug level and cut to `max_body_length` characters.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    /// Whether logging is enabled at all.
    pub enabled: bool,
    /// Log incoming requests.
    pub log_request: bool,
    /// Log outgoing responses.
    pub log_response: bool,
    /// Maximum number of body characters to log.
    pub max_body_length: usize,
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self {
            enabled: true,
            log_request: true,
            log_response: true,
            max_body_length: 500,
        }
    }
}

impl RequestLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the body truncation limit.
    pub fn with_max_body_length(mut self, max_body_length: usize) -> Self {
        self.max_body_length = max_body_length;
        self
    }

    /// Render a body for the log, truncated on a character boundary.
    pub fn preview(&self, body: &[u8]) -> String {
        if body.is_empty() {
            return "<empty>".to_string();
        }
        let text = String::from_utf8_lossy(body);
        let mut chars = text.chars();
        let mut preview: String = chars.by_ref().take(self.max_body_length).collect();
        if chars.next().is_some() {
            preview.push_str("...");
        }
        preview
    }
}

impl Middleware for RequestLogger {
    fn name(&self) -> &'static str {
        "request-logger"
    }

    fn on_request(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, Error> {
        if self.enabled && self.log_request {
            info!("--> {} {}", request.method, request.path);
            for (name, value) in request.headers.iter() {
                debug!("    {name}: {value}");
            }
            debug!("    body: {}", self.preview(&request.body));
        }
        Ok(None)
    }

    fn on_response(&self, request: &HttpRequest, response: &mut HttpResponse) -> Result<(), Error> {
        if self.enabled && self.log_response {
            info!(
                "<-- {} {} {}",
                response.status.as_u16(),
                request.method,
                request.path
            );
            debug!("    body: {}", self.preview(&response.body));
        }
        Ok(())
    }
}
