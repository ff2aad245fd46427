use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::SessionContext;
use crate::app::AppState;
use crate::config::GateConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Location of the login page, carrying the original destination
    Redirect(String),
}

/// Decide whether a request may reach `path`.
///
/// Only checks that some credential is present. Missing and expired tokens
/// look the same here.
pub fn check(gate: &GateConfig, path: &str, query: Option<&str>, session: &SessionContext) -> GateDecision {
    let Some(area) = gate.area_for(path) else {
        return GateDecision::Allow;
    };

    if area.is_login(path) || session.has_credential() {
        return GateDecision::Allow;
    }

    let destination = match query {
        Some(q) if !q.is_empty() => format!("{}?{}", path, q),
        _ => path.to_string(),
    };

    GateDecision::Redirect(login_redirect(&area.login_path, &gate.redirect_param, &destination))
}

/// `login_path?param=<destination>` with the destination form-encoded
pub fn login_redirect(login_path: &str, param: &str, destination: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(param, destination)
        .finish();
    format!("{}?{}", login_path, query)
}

/// Middleware that turns away credential-less requests to protected areas
pub async fn access_gate(
    State(state): State<AppState>,
    session: SessionContext,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    match check(&state.config.gate, &path, query.as_deref(), &session) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(location) => {
            tracing::info!("Access gate redirecting {} to {}", path, location);
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn anonymous() -> SessionContext {
        SessionContext::default()
    }

    #[test]
    fn unprotected_paths_pass() {
        let gate = AppConfig::development().gate;
        assert_eq!(check(&gate, "/", None, &anonymous()), GateDecision::Allow);
        assert_eq!(check(&gate, "/api/auth/login", None, &anonymous()), GateDecision::Allow);
        assert_eq!(check(&gate, "/administrator", None, &anonymous()), GateDecision::Allow);
    }

    #[test]
    fn login_page_is_exempt() {
        let gate = AppConfig::development().gate;
        assert_eq!(check(&gate, "/admin/login", None, &anonymous()), GateDecision::Allow);
    }

    #[test]
    fn missing_credential_redirects_with_return_path() {
        let gate = AppConfig::development().gate;
        assert_eq!(
            check(&gate, "/admin/users", Some("page=2"), &anonymous()),
            GateDecision::Redirect("/admin/login?redirect=%2Fadmin%2Fusers%3Fpage%3D2".to_string())
        );
        assert_eq!(
            check(&gate, "/seafarer/documents", None, &anonymous()),
            GateDecision::Redirect("/login?redirect=%2Fseafarer%2Fdocuments".to_string())
        );
    }

    #[test]
    fn any_credential_passes() {
        let gate = AppConfig::development().gate;
        let session = SessionContext::new(Some("not-even-a-jwt".to_string()), None);
        assert_eq!(check(&gate, "/admin/dashboard", None, &session), GateDecision::Allow);
    }
}
