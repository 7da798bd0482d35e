//! Tests for path patterns and routes.

#[cfg(test)]
mod routing_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::parser::{HttpRequest, Method};
    use crate::routing::{PathPattern, PatternError, Route, Segment};
    use crate::server::{handler_fn, Error, HandlerFn, HttpResponse, StatusCode};

    fn echo_params() -> HandlerFn {
        handler_fn(|req: HttpRequest| async move {
            let mut pairs: Vec<String> = req.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            pairs.sort();
            Ok(HttpResponse::new(StatusCode::Ok).with_body_string(pairs.join("&")))
        })
    }

    async fn failing(_req: HttpRequest) -> Result<HttpResponse, Error> {
        Err(Error::InternalError("database unavailable".to_string()))
    }

    async fn panicking(_req: HttpRequest) -> Result<HttpResponse, Error> {
        panic!("handler exploded")
    }

    #[test]
    fn test_compile_segments() {
        let pattern = PathPattern::compile("/users/<id>/posts").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("users".to_string()),
                Segment::Capture("id".to_string()),
                Segment::Literal("posts".to_string()),
            ]
        );
        assert_eq!(pattern.template(), "/users/<id>/posts");
        assert_eq!(pattern.capture_names().collect::<Vec<_>>(), vec!["id"]);
        assert!(!pattern.is_literal());
        assert!(PathPattern::compile("/about").unwrap().is_literal());
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(PathPattern::compile(""), Err(PatternError::Empty));
        assert!(matches!(
            PathPattern::compile("users"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            PathPattern::compile("/users/<>"),
            Err(PatternError::EmptyCaptureName(_))
        ));
        assert_eq!(
            PathPattern::compile("/a/<id>/b/<id>"),
            Err(PatternError::DuplicateCaptureName("id".to_string()))
        );
        assert_eq!(
            PathPattern::compile("/a/<user-id>"),
            Err(PatternError::InvalidCaptureName("user-id".to_string()))
        );
        for template in ["/a/<id", "/a/id>", "/file/<name>.txt", "/<<id>>"] {
            assert!(
                matches!(PathPattern::compile(template), Err(PatternError::MalformedSegment(_))),
                "{template} should be rejected"
            );
        }
    }

    #[test]
    fn test_match_binds_exactly_the_captures() {
        let pattern: PathPattern = "/org/<org>/repo/<repo_name>".parse().unwrap();
        let params = pattern.matches("/org/rust-lang/repo/cargo").unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params["org"], "rust-lang");
        assert_eq!(params["repo_name"], "cargo");
    }

    #[test]
    fn test_match_is_anchored() {
        let pattern = PathPattern::compile("/users/<id>").unwrap();
        assert!(pattern.is_match("/users/42"));
        assert!(!pattern.is_match("/users"));
        assert!(!pattern.is_match("/users/"));
        assert!(!pattern.is_match("/users/42/edit"));
        assert!(!pattern.is_match("/api/users/42"));
        assert!(!pattern.is_match("users/42"));
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        let bare = PathPattern::compile("/a").unwrap();
        let slashed = PathPattern::compile("/a/").unwrap();
        assert!(bare.is_match("/a"));
        assert!(!bare.is_match("/a/"));
        assert!(slashed.is_match("/a/"));
        assert!(!slashed.is_match("/a"));
    }

    #[test]
    fn test_root_template() {
        let root = PathPattern::compile("/").unwrap();
        assert_eq!(root.matches("/").unwrap().len(), 0);
        assert!(!root.is_match("/index"));
        assert!(!root.is_match(""));
    }

    #[test]
    fn test_route_defaults_to_get() {
        let route = Route::new("/", &[], echo_params()).unwrap();
        assert_eq!(route.methods(), &[Method::GET]);

        let other = Route::new("/x", &[], echo_params()).unwrap();
        assert_eq!(other.methods(), &[Method::GET]);

        let deduped = Route::new("/y", &[Method::POST, Method::GET, Method::POST], echo_params()).unwrap();
        assert_eq!(deduped.methods(), &[Method::POST, Method::GET]);
    }

    #[test]
    fn test_route_rejects_bad_template() {
        assert!(Route::new("/a/<id>/<id>", &[Method::GET], echo_params()).is_err());
    }

    #[tokio::test]
    async fn test_dispatch_binds_params() {
        let route = Route::new("/users/<id>", &[Method::GET], echo_params()).unwrap();
        let mut request = HttpRequest::new(Method::GET, "/users/42");
        request.params.insert("stale".to_string(), "value".to_string());

        let response = route.dispatch(&mut request).await;

        assert_eq!(response.status, StatusCode::Ok);
        assert_eq!(response.body_str(), Some("id=42"));
        assert_eq!(request.params.len(), 1);
        assert_eq!(request.param("id"), Some("42"));
    }

    #[tokio::test]
    async fn test_method_checked_before_path() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler = handler_fn(move |_req| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(HttpResponse::new(StatusCode::Ok)) }
        });
        let route = Route::new("/users/<id>", &[Method::GET], handler).unwrap();

        let mut wrong_both = HttpRequest::new(Method::POST, "/nowhere");
        let response = route.dispatch(&mut wrong_both).await;
        assert_eq!(response.status, StatusCode::MethodNotAllowed);
        assert_eq!(response.body_str(), Some("Method Not Allowed"));
        assert!(wrong_both.params.is_empty());

        let mut wrong_path = HttpRequest::new(Method::GET, "/nowhere");
        let response = route.dispatch(&mut wrong_path).await;
        assert_eq!(response.status, StatusCode::NotFound);
        assert_eq!(response.body_str(), Some("Not Found"));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_is_contained() {
        let route = Route::new("/fail", &[Method::GET], handler_fn(failing)).unwrap();
        let response = route.dispatch(&mut HttpRequest::new(Method::GET, "/fail")).await;
        assert_eq!(response.status, StatusCode::InternalServerError);
        assert_eq!(response.body_str(), Some("Internal Server Error"));
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let route = Route::new("/boom", &[Method::GET], handler_fn(panicking)).unwrap();

        for _ in 0..2 {
            let response = route.dispatch(&mut HttpRequest::new(Method::GET, "/boom")).await;
            assert_eq!(response.status, StatusCode::InternalServerError);
        }
    }

    #[tokio::test]
    async fn test_handler_error_status_is_not_leaked() {
        let handler = handler_fn(|req: HttpRequest| async move { Err(Error::NotFound(req.path)) });
        let route = Route::new("/lookup", &[Method::GET], handler).unwrap();
        let response = route.dispatch(&mut HttpRequest::new(Method::GET, "/lookup")).await;
        assert_eq!(response.status, StatusCode::InternalServerError);
    }

    #[tokio::test]
    async fn test_run_uses_given_captures() {
        let route = Route::new("/users/<id>", &[Method::GET], echo_params()).unwrap();
        let mut request = HttpRequest::new(Method::GET, "/users/12");
        let params = route.pattern().matches(&request.path).unwrap();

        let response = route.run(&mut request, params).await.unwrap();
        assert_eq!(response.body_str(), Some("id=12"));
        assert_eq!(request.param("id"), Some("12"));
    }

    #[tokio::test]
    async fn test_run_reports_failures() {
        let route = Route::new("/fail", &[Method::GET], handler_fn(failing)).unwrap();
        let outcome = route.run(&mut HttpRequest::new(Method::GET, "/fail"), Default::default()).await;
        assert!(matches!(outcome, Err(Error::InternalError(ref m)) if m == "database unavailable"));

        let route = Route::new("/boom", &[Method::GET], handler_fn(panicking)).unwrap();
        let outcome = route.run(&mut HttpRequest::new(Method::GET, "/boom"), Default::default()).await;
        assert!(matches!(outcome, Err(Error::Panic(ref m)) if m == "handler exploded"));
    }
}
