//! Tests for request decoding.

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::parser::{parse_request, Error, Headers, HttpRequest, HttpVersion, Method};

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.path, "/index.html");
        assert_eq!(result.version, HttpVersion::Http11);
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert!(result.body.is_empty());
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_case_insensitive_headers() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert!(result.has_header("host"));
        assert!(result.has_header("HOST"));
        assert_eq!(result.get_header("hOsT"), Some("example.com"));
    }

    #[test]
    fn test_duplicate_headers_last_write_wins_across_case() {
        let request = b"GET / HTTP/1.1\r\nHost: example.com\r\nX-Test: value1\r\nx-test: value2\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("X-Test"), Some("value2"));
        assert_eq!(result.headers.len(), 2);
        let names: Vec<&str> = result.headers.iter().map(|(name, _)| name).collect();
        assert!(names.contains(&"x-test"));
    }

    #[test]
    fn test_missing_host_header() {
        let request = b"GET /index.html HTTP/1.1\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MissingHeader(ref h)) if h == "Host"));
    }

    #[test]
    fn test_http10_without_host() {
        let request = b"GET /index.html HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.version, HttpVersion::Http10);
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_invalid_method() {
        let request = b"BREW /pot HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "BREW"));
    }

    #[test]
    fn test_invalid_http_version() {
        let request = b"GET /index.html HTTP/9.9\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/9.9"));
    }

    #[test]
    fn test_path_must_start_with_slash() {
        let request = b"GET index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidPath(ref p)) if p == "index.html"));
    }

    #[test]
    fn test_invalid_header_format() {
        let request = b"GET /index.html HTTP/1.1\r\nInvalidHeader\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::InvalidHeaderFormat(_))));

        let request = b"GET /index.html HTTP/1.1\r\n: no-name\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::InvalidHeaderFormat(_))));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(parse_request(b""), Err(Error::EmptyRequest)));
        assert!(matches!(parse_request(b"\r\n"), Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_malformed_request_lines() {
        assert!(matches!(parse_request(b"GET\r\n"), Err(Error::MalformedRequestLine(_))));
        assert!(matches!(
            parse_request(b"GET  HTTP/1.1\r\nHost: example.com\r\n\r\n"),
            Err(Error::MalformedRequestLine(_))
        ));
    }

    #[test]
    fn test_all_methods() {
        for method in ["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH"] {
            let raw = format!("{method} / HTTP/1.1\r\nHost: example.com\r\n\r\n");
            let result = parse_request(raw.as_bytes()).unwrap();
            assert_eq!(result.method.as_str(), method);
            assert_eq!(result.method.to_string(), method);
        }
    }

    #[test]
    fn test_http_version_display() {
        assert_eq!(HttpVersion::Http10.to_string(), "HTTP/1.0");
        assert_eq!(HttpVersion::Http11.to_string(), "HTTP/1.1");
        assert_eq!(HttpVersion::Http20.to_string(), "HTTP/2");
        assert_eq!("HTTP/2.0".parse::<HttpVersion>().unwrap(), HttpVersion::Http20);
    }

    #[test]
    fn test_mixed_line_endings_and_whitespace() {
        let request = b"GET  /index.html  HTTP/1.1\r\nHost: example.com  \nUser-Agent:  test  \r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/index.html");
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert_eq!(result.headers.get("User-Agent").unwrap(), "test");
    }

    #[test]
    fn test_headers_with_multiple_colons() {
        let request = b"GET / HTTP/1.1\r\nHost: example.com\r\nX-Test: value:with:colons\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("X-Test").unwrap(), "value:with:colons");
    }

    #[test]
    fn test_query_string_is_split_from_path() {
        let request = b"GET /search?q=test&flag&empty=&filter=name:john HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/search");
        assert_eq!(result.get_query_param("q").unwrap(), "test");
        assert_eq!(result.get_query_param("flag").unwrap(), "");
        assert_eq!(result.get_query_param("empty").unwrap(), "");
        assert_eq!(result.get_query_param("filter").unwrap(), "name:john");
        assert!(!result.has_query_param("page"));
    }

    #[test]
    fn test_malformed_utf8_in_head() {
        let request = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nX-Test: \xFF\xFF\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidUtf8)));
    }

    #[test]
    fn test_body_is_kept_verbatim() {
        let request = b"POST /api/users?role=admin HTTP/1.1\r\n\
            Host: example.com\r\n\
            Content-Type: application/json\r\n\
            \r\n\
            {\"name\":\"John Doe\",\"email\":\"john@example.com\"}";

        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::POST);
        assert_eq!(result.path, "/api/users");
        assert_eq!(result.get_query_param("role").unwrap(), "admin");
        assert_eq!(
            result.body_str(),
            Some("{\"name\":\"John Doe\",\"email\":\"john@example.com\"}")
        );
    }

    #[test]
    fn test_binary_body_after_utf8_head() {
        let mut raw = b"PUT /blob HTTP/1.0\r\n\r\n".to_vec();
        raw.extend_from_slice(&[0xFF, 0x00, 0xFE]);
        let result = parse_request(&raw).unwrap();
        assert_eq!(result.body, vec![0xFF, 0x00, 0xFE]);
        assert!(result.body_str().is_none());
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::new(Method::GET, "users?page=2")
            .with_header("Content-Type", "application/json")
            .with_version(HttpVersion::Http10);

        assert_eq!(request.path, "/users");
        assert_eq!(request.get_query_param("page").unwrap(), "2");
        assert_eq!(request.version, HttpVersion::Http10);
        assert!(request.is_json());
        assert!(request.param("id").is_none());
    }

    #[test]
    fn test_headers_map() {
        let mut headers: Headers = [("Accept", "*/*"), ("HOST", "a")].into_iter().collect();
        assert_eq!(headers.insert("host", "b"), Some("a".to_string()));
        assert_eq!(headers.get("Host"), Some("b"));
        assert_eq!(headers.remove("ACCEPT"), Some("*/*".to_string()));
        assert_eq!(headers.len(), 1);
        assert!(!headers.contains("accept"));
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestUser {
        name: String,
        email: String,
    }

    #[test]
    fn test_json_parsing() {
        let body = r#"{"name":"John Doe","email":"john@example.com"}"#;
        let request = HttpRequest::new(Method::POST, "/api/users")
            .with_header("content-type", "application/json; charset=utf-8")
            .with_body(body);

        let user: TestUser = request.json().unwrap();
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "john@example.com");

        let request_no_json = request.clone().with_header("Content-Type", "text/plain");
        let result: Result<TestUser, _> = request_no_json.json();
        assert!(matches!(result, Err(Error::MissingHeader(_))));

        let request_invalid_json = request.with_body(r#"{"name":"John Doe","email":}"#);
        let result: Result<TestUser, _> = request_invalid_json.json();
        assert!(matches!(result, Err(Error::JsonError(_))));
    }
}
