use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::types::UserIdentity;

/// Everything the portal knows about the caller, read once per request.
///
/// Both the access gate and the role guard consult this same value, so a
/// navigation never sees two different answers to "who is this".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionContext {
    credential: Option<String>,
    user: Option<UserIdentity>,
}

impl SessionContext {
    pub fn new(credential: Option<String>, user: Option<UserIdentity>) -> Self {
        let credential = credential
            .filter(|c| !c.trim().is_empty())
            .or_else(|| user.as_ref().and_then(|u| u.token.clone()).filter(|c| !c.trim().is_empty()));
        Self { credential, user }
    }

    /// Build the session from the session cookies, falling back to the Authorization header
    pub fn from_headers(headers: &HeaderMap, config: &SessionConfig) -> Self {
        let credential = read_cookie(headers, &config.token_cookie)
            .filter(|c| !c.is_empty())
            .or_else(|| extract_bearer_from_headers(headers));

        let user = read_cookie(headers, &config.user_cookie).and_then(|raw| decode_user_cookie(&raw));

        Self::new(credential, user)
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    /// Presence only; the crew service decides whether the credential is any good
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

/// Middleware that reads the caller's session once and stores it on the request
pub async fn load_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = SessionContext::from_headers(request.headers(), &state.config.session);

    tracing::debug!(
        "Session loaded for {}: credential={} user={}",
        request.uri().path(),
        session.has_credential(),
        session.user().map(|u| u.role.as_str()).unwrap_or("-")
    );

    request.extensions_mut().insert(session);
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<SessionContext>().cloned().ok_or_else(|| {
            tracing::error!("SessionContext requested on a route without the session layer");
            ApiError::internal_server_error("Internal server error")
        })
    }
}

/// Extract a bearer credential from the Authorization header.
///
/// `Bearer <token>` is the expected form, but any other non-empty value is
/// taken as the token itself.
pub fn extract_bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match auth_str.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if auth_str.eq_ignore_ascii_case("bearer") => "",
        _ => auth_str,
    };

    (!token.is_empty()).then(|| token.to_string())
}

/// Look up a cookie by name across every Cookie header
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
}

pub fn encode_user_cookie(user: &UserIdentity) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(user)?;
    Ok(url::form_urlencoded::byte_serialize(json.as_bytes()).collect())
}

pub fn decode_user_cookie(raw: &str) -> Option<UserIdentity> {
    // byte_serialize escapes '&' and '=', so the whole value decodes as a single key
    let json = url::form_urlencoded::parse(raw.as_bytes()).next().map(|(key, _)| key.into_owned())?;

    match serde_json::from_str(&json) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::debug!("Ignoring unreadable user cookie: {}", e);
            None
        }
    }
}

/// `Set-Cookie` value for a session cookie
pub fn session_cookie(name: &str, value: &str, config: &SessionConfig, http_only: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        name, value, config.cookie_max_age_secs
    );
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if config.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes a session cookie
pub fn expired_cookie(name: &str) -> String {
    format!("{}=; Path=/; Max-Age=0; SameSite=Lax", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::types::Role;
    use axum::http::HeaderValue;

    fn seafarer(token: Option<&str>) -> UserIdentity {
        UserIdentity {
            id: "7".to_string(),
            name: "Ana Reyes".to_string(),
            email: "ana@example.com".to_string(),
            role: Role::Seafarer,
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn cookie_credential_wins_over_header() {
        let config = AppConfig::development().session;
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=from-cookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        let session = SessionContext::from_headers(&headers, &config);
        assert_eq!(session.credential(), Some("from-cookie"));
    }

    #[test]
    fn header_credential_used_without_cookie() {
        let config = AppConfig::development().session;
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer abc.def"));

        let session = SessionContext::from_headers(&headers, &config);
        assert_eq!(session.credential(), Some("abc.def"));
        assert!(session.user().is_none());
    }

    #[test]
    fn blank_values_are_not_credentials() {
        let config = AppConfig::development().session;
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));

        assert!(!SessionContext::from_headers(&headers, &config).has_credential());
    }

    #[test]
    fn user_cookie_round_trips_and_supplies_token() {
        let config = AppConfig::development().session;
        let encoded = encode_user_cookie(&seafarer(Some("projection-token"))).unwrap();
        assert!(!encoded.contains(';'));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("user={}", encoded)).unwrap(),
        );

        let session = SessionContext::from_headers(&headers, &config);
        assert_eq!(session.user(), Some(&seafarer(Some("projection-token"))));
        assert_eq!(session.credential(), Some("projection-token"));
    }

    #[test]
    fn garbage_user_cookie_is_ignored() {
        assert!(decode_user_cookie("%7Bnot-json").is_none());
    }

    #[test]
    fn cookie_attributes_follow_config() {
        let mut config = AppConfig::development().session;
        config.secure_cookies = true;
        let cookie = session_cookie("token", "abc", &config, true);
        assert!(cookie.starts_with("token=abc; Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
        assert_eq!(expired_cookie("token"), "token=; Path=/; Max-Age=0; SameSite=Lax");
    }
}
