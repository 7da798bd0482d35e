//! Drive a dispatcher directly with hand-built requests, no socket involved.

use log::info;
use microroute_rs::{
    parse_request, Dispatcher, HttpRequest, HttpResponse, Method, Middleware, ServerError, StatusCode,
};

/// Stamps every response with the matched method.
struct Stamp;

impl Middleware for Stamp {
    fn name(&self) -> &'static str {
        "stamp"
    }

    fn on_response(&self, request: &HttpRequest, response: &mut HttpResponse) -> Result<(), ServerError> {
        response.headers.insert("X-Method", request.method.as_str());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let mut app = Dispatcher::new();
    app.add_middleware(Stamp);
    app.get("/users/<id>", |req: HttpRequest| async move {
        let id = req.param("id").unwrap_or_default().to_string();
        Ok(HttpResponse::new(StatusCode::Ok).with_body_string(format!("user:{id}")))
    })?
    .get("/boom", |_req| async { Err(ServerError::InternalError("storage offline".to_string())) })?;
    app.set_not_found_handler(|req| {
        HttpResponse::new(StatusCode::NotFound).with_body_string(format!("no page at {}", req.path))
    });
    app.set_error_handler(|req, err| {
        HttpResponse::new(StatusCode::InternalServerError).with_body_string(format!("{} failed: {err}", req.path))
    });

    let requests = [
        HttpRequest::new(Method::GET, "/users/42"),
        HttpRequest::new(Method::POST, "/users/42"),
        HttpRequest::new(Method::GET, "/users"),
        HttpRequest::new(Method::GET, "/boom"),
        parse_request(b"GET /users/7?verbose=1 HTTP/1.1\r\nHost: localhost\r\n\r\n")?,
    ];

    for request in requests {
        let line = format!("{} {}", request.method, request.path);
        let response = app.handle(request).await;
        info!(
            "{line} -> {} {} {:?}",
            response.status.as_u16(),
            response.status.reason_phrase(),
            response.body_str().unwrap_or("<binary>")
        );
    }

    Ok(())
}
