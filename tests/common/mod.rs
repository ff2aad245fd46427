#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Form, Path},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crew_portal::app::{app, AppState};
use crew_portal::config::AppConfig;
use crew_portal::middleware::session::encode_user_cookie;
use crew_portal::types::{Role, UserIdentity};

pub const SEAFARER_EMAIL: &str = "sea@example.com";
pub const SEAFARER_PASSWORD: &str = "secret123";
pub const SEAFARER_TOKEN: &str = "seafarer-access-token";

pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn bind() -> Result<(TcpListener, SocketAddr)> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let addr = listener.local_addr()?;
    Ok((listener, addr))
}

/// Serve the portal in-process against the given config
pub async fn spawn_app(config: AppConfig) -> Result<TestServer> {
    let state = AppState::new(config)?;
    let (listener, addr) = bind().await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });
    Ok(TestServer {
        base_url: format!("http://{}", addr),
    })
}

/// Serve a stand-in crew service, returning its base URL
pub async fn spawn_upstream(router: Router) -> Result<String> {
    let (listener, addr) = bind().await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}/api/v1", addr))
}

/// A base URL nothing is listening on
pub fn unreachable_upstream() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}/api/v1", port))
}

pub fn test_config(upstream: &str) -> AppConfig {
    let mut config = AppConfig::development();
    config.upstream.base_url = upstream.to_string();
    config.upstream.connect_timeout_secs = 2;
    config.security.jwt_secret = "test-jwt-secret".to_string();
    config
}

/// Client that reports redirects instead of following them
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build client")
}

pub fn user(role: Role, name: &str) -> UserIdentity {
    UserIdentity {
        id: "42".to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", role),
        role,
        token: None,
    }
}

/// Cookie header for a signed-in session with the given projection
pub fn session_cookie(token: &str, user: &UserIdentity) -> String {
    let value = encode_user_cookie(user).expect("user projection encodes");
    format!("token={}; user={}", token, value)
}

/// Observations made by the stand-in crew service
#[derive(Default)]
pub struct UpstreamLog {
    pub reset_confirms: AtomicUsize,
}

impl UpstreamLog {
    pub fn reset_confirms(&self) -> usize {
        self.reset_confirms.load(Ordering::SeqCst)
    }
}

#[derive(serde::Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn mock_login(Form(form): Form<LoginForm>) -> impl IntoResponse {
    if form.username == SEAFARER_EMAIL && form.password == SEAFARER_PASSWORD {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": SEAFARER_TOKEN,
                "token_type": "bearer",
                "user": { "id": 7, "full_name": "Ana Reyes", "email": SEAFARER_EMAIL, "role": "seafarer" }
            })),
        )
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Incorrect email or password" })))
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Stand-in crew service covering the routes the integration tests touch
pub fn mock_upstream(log: Arc<UpstreamLog>) -> Router {
    let api = Router::new()
        .route("/auth/login", post(mock_login))
        .route(
            "/auth/password-reset/confirm",
            post(move || {
                let log = log.clone();
                async move {
                    log.reset_confirms.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "detail": "Password updated" }))
                }
            }),
        )
        .route(
            "/users/me",
            get(|headers: HeaderMap| async move {
                Json(json!({ "id": 7, "role": "seafarer", "seen_token": bearer(&headers) }))
            }),
        )
        .route(
            "/seafarer/documents",
            get(|| async { Json(json!([{ "id": 1, "type": "passport" }, { "id": 2, "type": "stcw" }])) }).post(
                |headers: HeaderMap, body: Bytes| async move {
                    let content_type = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    (
                        StatusCode::CREATED,
                        Json(json!({ "content_type": content_type, "size": body.len() })),
                    )
                },
            ),
        )
        .route(
            "/documents/:id/status",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "db down" }))) }),
        )
        .route(
            "/documents/:id",
            get(|Path(id): Path<String>| async move {
                match id.as_str() {
                    "9" => Json(json!({ "id": 9, "file_key": "seafarers/7/passport scan.pdf" })).into_response(),
                    "10" => Json(json!({ "id": 10, "file_key": null })).into_response(),
                    _ => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Document not found" }))).into_response(),
                }
            }),
        )
        .route(
            "/admin/users/:id/status",
            patch(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                Json(json!({ "id": id, "status": body["status"] }))
            }),
        )
        .route(
            "/seafarer/contracts",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "detail": "contracts offline" }))) }),
        )
        .route(
            "/shipowner/vessels",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html>maintenance</html>") }),
        )
        .route(
            "/shipowner/crew",
            get(|| async { (StatusCode::BAD_GATEWAY, Json(json!({ "detail": "crew index stale" }))) }),
        );

    Router::new().nest("/api/v1", api)
}

/// Portal wired to a fresh stand-in crew service
pub async fn spawn_stack() -> Result<(TestServer, Arc<UpstreamLog>)> {
    let log = Arc::new(UpstreamLog::default());
    let upstream = spawn_upstream(mock_upstream(log.clone())).await?;
    let server = spawn_app(test_config(&upstream)).await?;
    Ok((server, log))
}

pub async fn body_json(res: reqwest::Response) -> Result<Value> {
    Ok(res.json::<Value>().await?)
}
