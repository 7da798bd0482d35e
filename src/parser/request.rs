//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::headers::Headers;
use crate::parser::protocol::{HttpVersion, Method};
use crate::routing::Params;

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path, without the query string. Always starts with `/`.
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: Headers,
    /// The request body
    pub body: Vec<u8>,
    /// Query parameters parsed from the request target
    pub query_params: HashMap<String, String>,
    /// Path captures bound by the matching route. Empty until routing.
    pub params: Params,
}

impl HttpRequest {
    /// Create a new HTTP/1.1 request with no headers and an empty body.
    ///
    /// A query string in `target` is split off into `query_params`, and a
    /// missing leading `/` is added.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        let target = target.into();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query)),
            None => (target.clone(), None),
        };

        let query_params = query
            .map(|query| {
                query
                    .split('&')
                    .filter(|s| !s.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((k, v)) => (k.to_string(), v.to_string()),
                        None => (pair.to_string(), String::new()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        Self {
            method,
            path,
            version: HttpVersion::default(),
            headers: Headers::new(),
            body: Vec::new(),
            query_params,
            params: Params::new(),
        }
    }

    /// Set the protocol version.
    pub fn with_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header value, ignoring case.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// Get a path capture bound by routing.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Parse the request body as JSON.
    ///
    /// Fails if the `Content-Type` is not `application/json` or the body does
    /// not deserialize into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        let json = serde_json::from_slice(&self.body)?;
        Ok(json)
    }

    /// Check if the request declares a JSON body.
    pub fn is_json(&self) -> bool {
        self.get_header("Content-Type")
            .is_some_and(|content_type| content_type.starts_with("application/json"))
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Check if a query parameter exists.
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params.contains_key(name)
    }
}

/// Parse an HTTP request from a byte slice.
///
/// The request line and headers must be UTF-8; everything after the blank
/// line that ends the header section is taken verbatim as the body.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let (head, body) = split_head(input);

    let head = std::str::from_utf8(head).map_err(|_| Error::InvalidUtf8)?;

    let mut lines = head.lines();

    let request_line = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(Error::EmptyRequest),
    };

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let target = parts[1];
    if !target.starts_with('/') {
        return Err(Error::InvalidPath(target.to_string()));
    }

    let version = HttpVersion::from_str(parts[2])?;

    let mut headers = Headers::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::InvalidHeaderFormat(line.to_string()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidHeaderFormat(line.to_string()));
        }

        headers.insert(name, value.trim());
    }

    if version.requires_host() && !headers.contains("Host") {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    let mut request = HttpRequest::new(method, target).with_version(version);
    request.headers = headers;
    request.body = body.to_vec();
    Ok(request)
}

/// Split raw input at the first blank line into head and body.
fn split_head(input: &[u8]) -> (&[u8], &[u8]) {
    match head_bounds(input) {
        Some((head_end, body_start)) => (&input[..head_end], &input[body_start..]),
        None => (input, &[]),
    }
}

/// End of the head and start of the body, once the blank line has arrived.
///
/// `\r\n\r\n` is preferred; a bare `\n\n` is accepted as well.
pub(crate) fn head_bounds(input: &[u8]) -> Option<(usize, usize)> {
    if let Some(pos) = find(input, b"\r\n\r\n") {
        return Some((pos, pos + 4));
    }
    find(input, b"\n\n").map(|pos| (pos, pos + 2))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
