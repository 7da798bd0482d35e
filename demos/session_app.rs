//! A small JSON API with a login flow and a session-guarded `/account` area.
//!
//! ```text
//! curl -X POST localhost:8080/login -H 'Host: x' -d '{"user": "alice"}'
//! curl localhost:8080/account/profile -H 'Host: x' -H 'X-Session: <id>'
//! ```

use std::time::Duration;

use log::info;
use microroute_rs::{
    Blueprint, Dispatcher, HttpRequest, HttpResponse, HttpServer, Method, Middleware, RequestLogger, ResponseHeaders,
    ServerConfig, ServerError, SessionRegistry, StatusCode,
};
use serde::Deserialize;
use serde_json::json;

const SESSION_HEADER: &str = "X-Session";

#[derive(Deserialize)]
struct Login {
    user: String,
}

/// Answers 401 for `/account` requests without a live session.
struct SessionGuard {
    sessions: SessionRegistry,
}

impl Middleware for SessionGuard {
    fn name(&self) -> &'static str {
        "session-guard"
    }

    fn on_request(&self, request: &HttpRequest) -> Result<Option<HttpResponse>, ServerError> {
        if !request.path.starts_with("/account") {
            return Ok(None);
        }

        let Some(id) = request.get_header(SESSION_HEADER) else {
            return Ok(Some(HttpResponse::from_status(StatusCode::Unauthorized)));
        };
        if self.sessions.resolve(id).is_none() {
            return Ok(Some(HttpResponse::from_status(StatusCode::Unauthorized)));
        }

        self.sessions.renew(id);
        Ok(None)
    }
}

fn account(sessions: &SessionRegistry) -> Blueprint {
    let mut bp = Blueprint::new("account").with_prefix("/account");

    let profile_sessions = sessions.clone();
    bp.add_route("/profile", &[], move |req: HttpRequest| {
        let sessions = profile_sessions.clone();
        async move {
            let id = req.get_header(SESSION_HEADER).unwrap_or_default();
            let user = sessions.resolve(id);
            let theme = sessions.get_data(id, "theme");
            HttpResponse::new(StatusCode::Ok).with_json(&json!({ "user": user, "theme": theme }))
        }
    });

    let theme_sessions = sessions.clone();
    bp.add_route("/theme/<name>", &[Method::PUT], move |req: HttpRequest| {
        let sessions = theme_sessions.clone();
        async move {
            let id = req.get_header(SESSION_HEADER).unwrap_or_default();
            let theme = req.param("name").unwrap_or("light");
            sessions.set_data(id, "theme", theme);
            Ok(HttpResponse::new(StatusCode::NoContent))
        }
    });

    bp
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ServerConfig::from_env()?;
    let sessions = SessionRegistry::with_timeout(Duration::from_secs(15 * 60));
    let sweeper = sessions.spawn_sweeper(Duration::from_secs(60));

    let mut app = Dispatcher::new();
    app.add_middleware(RequestLogger::new())
        .add_middleware(SessionGuard { sessions: sessions.clone() })
        .add_middleware(ResponseHeaders::new().with("X-Content-Type-Options", "nosniff"));

    app.get("/", |_req| async {
        Ok(HttpResponse::new(StatusCode::Ok)
            .with_content_type("text/plain")
            .with_body_string("POST /login to start a session"))
    })?;

    let login_sessions = sessions.clone();
    app.post("/login", move |req: HttpRequest| {
        let sessions = login_sessions.clone();
        async move {
            let Ok(login) = req.json::<Login>() else {
                return Ok(HttpResponse::from_status(StatusCode::BadRequest));
            };
            let id = sessions.create(login.user);
            HttpResponse::new(StatusCode::Created).with_json(&json!({ "session": id }))
        }
    })?;

    let logout_sessions = sessions.clone();
    app.post("/logout", move |req: HttpRequest| {
        let sessions = logout_sessions.clone();
        async move {
            let ended = req
                .get_header(SESSION_HEADER)
                .is_some_and(|id| sessions.invalidate(id));
            let status = if ended { StatusCode::NoContent } else { StatusCode::NotFound };
            Ok(HttpResponse::new(status))
        }
    })?;

    app.register_blueprint(account(&sessions))?;

    info!("Sessions expire after {:?} of inactivity", sessions.timeout());
    HttpServer::new(config, app).start().await?;

    sweeper.abort();
    Ok(())
}
