// Server-rendered page shells. Markup is bare; what matters here
// is which pages a session may reach.

use axum::{
    extract::{OriginalUri, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

use crate::app::AppState;
use crate::middleware::{GuardState, SessionContext};
use crate::types::Role;

#[derive(Debug)]
pub struct Page {
    pub path: &'static str,
    pub title: &'static str,
    /// Roles that may see the page; empty means public
    pub allowed: &'static [Role],
}

pub static PAGES: &[Page] = &[
    Page { path: "/login", title: "Sign in", allowed: &[] },
    Page { path: "/register", title: "Create an account", allowed: &[] },
    Page { path: "/forgot-password", title: "Forgot password", allowed: &[] },
    Page { path: "/reset-password", title: "Reset password", allowed: &[] },
    Page { path: "/admin/login", title: "Administrator sign in", allowed: &[] },
    Page { path: "/admin/dashboard", title: "Admin Dashboard", allowed: &[Role::Admin] },
    Page { path: "/admin/users", title: "Users", allowed: &[Role::Admin] },
    Page { path: "/admin/documents", title: "Document Review", allowed: &[Role::Admin] },
    Page { path: "/seafarer/dashboard", title: "Seafarer Dashboard", allowed: &[Role::Seafarer] },
    Page { path: "/seafarer/documents", title: "My Documents", allowed: &[Role::Seafarer] },
    Page { path: "/seafarer/profile", title: "My Profile", allowed: &[Role::Seafarer] },
    Page { path: "/shipowner/dashboard", title: "Ship Owner Dashboard", allowed: &[Role::ShipOwner] },
    Page { path: "/shipowner/vessels", title: "Vessels", allowed: &[Role::ShipOwner] },
    Page { path: "/shipowner/crew", title: "Crew", allowed: &[Role::ShipOwner] },
];

pub fn routes() -> Router<AppState> {
    PAGES
        .iter()
        .fold(Router::new().route("/", get(home)), |router, page| {
            router.route(
                page.path,
                get(move |State(state): State<AppState>, session: SessionContext, OriginalUri(uri): OriginalUri| async move {
                    render(page, &state, &session, uri.path())
                }),
            )
        })
}

/// GET / - send signed-in users to their dashboard, everyone else to login
async fn home(State(state): State<AppState>, session: SessionContext) -> Redirect {
    match session.user() {
        Some(user) if session.has_credential() => Redirect::temporary(&user.role.home_path()),
        _ => Redirect::temporary(&state.config.gate.default_login_path),
    }
}

fn render(page: &Page, state: &AppState, session: &SessionContext, path: &str) -> Response {
    if page.allowed.is_empty() {
        return Html(shell(page, None)).into_response();
    }

    let guard = GuardState::default().resolve(session, page.allowed);
    match guard.redirect_location(&state.config.gate, path) {
        Some(location) => {
            tracing::info!("Role guard sent {} to {} ({:?})", path, location, guard);
            Redirect::temporary(&location).into_response()
        }
        None => {
            let user_name = match &guard {
                GuardState::Authorized(user) => Some(user.name.as_str()),
                _ => None,
            };
            Html(shell(page, user_name)).into_response()
        }
    }
}

fn shell(page: &Page, user_name: Option<&str>) -> String {
    let greeting = user_name
        .map(|name| format!("<p class=\"session-user\">Signed in as {}</p>", escape_html(name)))
        .unwrap_or_default();

    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title} | Crew Portal</title></head>\n\
         <body data-page=\"{path}\">\n<h1>{title}</h1>\n{greeting}<div id=\"app\"></div>\n</body>\n</html>\n",
        title = escape_html(page.title),
        path = page.path,
        greeting = greeting,
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_protected_page_sits_under_its_role_prefix() {
        for page in PAGES.iter().filter(|p| !p.allowed.is_empty()) {
            assert_eq!(page.allowed.len(), 1, "{}", page.path);
            assert!(page.path.starts_with(&format!("/{}/", page.allowed[0])), "{}", page.path);
        }
    }

    fn state() -> AppState {
        AppState::new(crate::config::AppConfig::development()).unwrap()
    }

    fn signed_in(role: Role, name: &str) -> SessionContext {
        let user = crate::types::UserIdentity {
            id: "1".to_string(),
            name: name.to_string(),
            email: String::new(),
            role,
            token: None,
        };
        SessionContext::new(Some("tok".to_string()), Some(user))
    }

    #[test]
    fn render_is_either_a_page_or_a_redirect() {
        let state = state();
        let page = PAGES.iter().find(|p| p.path == "/shipowner/vessels").unwrap();

        let ok = render(page, &state, &signed_in(Role::ShipOwner, "Capt. Lind"), page.path);
        assert_eq!(ok.status(), axum::http::StatusCode::OK);

        let away = render(page, &state, &signed_in(Role::Admin, "Root"), page.path);
        assert_eq!(away.status(), axum::http::StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(away.headers()[axum::http::header::LOCATION], "/admin/dashboard");

        let anonymous = render(page, &state, &SessionContext::default(), page.path);
        assert_eq!(anonymous.headers()[axum::http::header::LOCATION], "/login?redirect=%2Fshipowner%2Fvessels");
    }

    #[test]
    fn shell_escapes_user_names() {
        let html = shell(&PAGES[5], Some("<script>Bob</script>"));
        assert!(html.contains("&lt;script&gt;Bob&lt;/script&gt;"));
        assert!(html.contains("data-page=\"/admin/dashboard\""));
    }
}
