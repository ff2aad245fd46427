// Public authentication routes: no caller credential needed.
//
// Login, registration and password reset are forwarded with the service
// token (when configured) instead of a user token.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::middleware::session::{encode_user_cookie, expired_cookie, session_cookie};
use crate::middleware::SessionContext;
use crate::proxy::{self, body, BodyTransform, Endpoint, Inbound, ProxyReply};
use crate::types::UserIdentity;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub static LOGIN: Endpoint = Endpoint::post("auth.login", "/auth/login")
    .public()
    .body(BodyTransform::JsonToForm)
    .require(&["email", "password"])
    .rename_form_fields(&[("email", "username")]);

pub static REGISTER: Endpoint = Endpoint::post("auth.register", "/auth/register")
    .public()
    .require(&["name", "email", "password", "role"]);

pub static PASSWORD_RESET_REQUEST: Endpoint =
    Endpoint::post("auth.password_reset.request", "/auth/password-reset/request")
        .public()
        .require(&["email"]);

pub static PASSWORD_RESET_CONFIRM: Endpoint =
    Endpoint::post("auth.password_reset.confirm", "/auth/password-reset/confirm")
        .public()
        .require(&["token", "new_password"]);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/register", proxy::route(&REGISTER))
        .route("/api/auth/password-reset/request", proxy::route(&PASSWORD_RESET_REQUEST))
        .route("/api/auth/password-reset/confirm", post(password_reset_confirm))
}

/// POST /api/auth/login - exchange email and password for a session
///
/// Status and body come back exactly as the crew service sent them. On
/// success the access token and the user projection are also stored as
/// cookies so page requests carry them.
pub async fn login(
    State(state): State<AppState>,
    session: SessionContext,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let reply = state.proxy.forward(&LOGIN, Inbound::new(&session, &headers, body)).await?;

    let cookies = match reply.body.as_ref() {
        Some(payload) if reply.is_success() => login_cookies(payload, &state.config.session),
        _ => Vec::new(),
    };

    if !cookies.is_empty() {
        tracing::info!("Login succeeded, session cookies issued");
    }

    let headers: Vec<(header::HeaderName, String)> =
        cookies.into_iter().map(|c| (header::SET_COOKIE, c)).collect();
    Ok((AppendHeaders(headers), reply).into_response())
}

fn login_cookies(payload: &Value, config: &SessionConfig) -> Vec<String> {
    let Some(token) = payload.get("access_token").and_then(Value::as_str).filter(|t| !t.is_empty()) else {
        return Vec::new();
    };

    let mut cookies = vec![session_cookie(&config.token_cookie, token, config, true)];

    let user = payload
        .get("user")
        .cloned()
        .and_then(|u| serde_json::from_value::<UserIdentity>(u).ok());
    match user {
        Some(mut user) => {
            user.token = Some(token.to_string());
            match encode_user_cookie(&user) {
                Ok(value) => cookies.push(session_cookie(&config.user_cookie, &value, config, false)),
                Err(e) => tracing::warn!("Could not encode user projection: {}", e),
            }
        }
        None => tracing::warn!("Login response carried no usable user record"),
    }

    cookies
}

/// POST /api/auth/logout - drop the session cookies
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config.session;
    (
        AppendHeaders([
            (header::SET_COOKIE, expired_cookie(&config.token_cookie)),
            (header::SET_COOKIE, expired_cookie(&config.user_cookie)),
        ]),
        (StatusCode::OK, Json(json!({ "detail": "Logged out" }))),
    )
}

/// POST /api/auth/password-reset/confirm - set a new password with a reset token
///
/// Short passwords are turned away here, before the crew service is called.
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    session: SessionContext,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ProxyReply, ApiError> {
    let payload = body::parse_json(&body)?;

    check_new_password(&payload)?;

    state
        .proxy
        .forward(&PASSWORD_RESET_CONFIRM, Inbound::new(&session, &headers, body))
        .await
}

/// A new password must be a string of at least `MIN_PASSWORD_LENGTH` characters
fn check_new_password(payload: &Value) -> Result<(), ApiError> {
    let too_short = || {
        ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))
    };

    match payload.get("new_password") {
        None | Some(Value::Null) => Err(ApiError::bad_request("new_password is required")),
        Some(Value::String(password)) if password.chars().count() >= MIN_PASSWORD_LENGTH => Ok(()),
        Some(Value::String(_)) => Err(too_short()),
        Some(_) => Err(ApiError::bad_request("new_password must be a string")),
    }
}
