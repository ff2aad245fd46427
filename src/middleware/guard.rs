use super::gate::login_redirect;
use super::session::SessionContext;
use crate::config::GateConfig;
use crate::types::{Role, UserIdentity};

/// Where a page stands with respect to its role allow-list.
///
/// A page starts out `Hydrating` and resolves exactly once, against the
/// request's [`SessionContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GuardState {
    #[default]
    Hydrating,
    Authorized(UserIdentity),
    Unauthorized(Role),
    Unauthenticated,
}

impl GuardState {
    pub fn resolve(self, session: &SessionContext, allowed: &[Role]) -> Self {
        if self != GuardState::Hydrating {
            return self;
        }

        match session.user() {
            // A projection without any credential is a leftover from a dead session
            Some(_) if !session.has_credential() => GuardState::Unauthenticated,
            None => GuardState::Unauthenticated,
            Some(user) if allowed.is_empty() || allowed.contains(&user.role) => {
                GuardState::Authorized(user.clone())
            }
            Some(user) => GuardState::Unauthorized(user.role),
        }
    }

    /// Redirect target for states that must not render; `None` means render
    pub fn redirect_location(&self, gate: &GateConfig, path: &str) -> Option<String> {
        match self {
            GuardState::Authorized(_) => None,
            GuardState::Unauthorized(role) => Some(role.home_path()),
            GuardState::Hydrating | GuardState::Unauthenticated => Some(login_redirect(
                gate.login_path_for(path),
                &gate.redirect_param,
                path,
            )),
        }
    }
}
