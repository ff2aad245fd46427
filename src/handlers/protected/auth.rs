use axum::{extract::State, routing::get, Json, Router};

use crate::app::AppState;
use crate::auth::{verify_token, Claims};
use crate::error::ApiError;
use crate::middleware::SessionContext;
use crate::proxy::{self, Endpoint};

pub static CURRENT_USER: Endpoint = Endpoint::get("auth.me", "/users/me");

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", proxy::route(&CURRENT_USER))
        .route("/api/auth/verify", get(verify))
}

/// GET /api/auth/verify - check the caller's token locally with the shared secret
pub async fn verify(State(state): State<AppState>, session: SessionContext) -> Result<Json<Claims>, ApiError> {
    let token = session
        .credential()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let claims = verify_token(token, &state.config.security.jwt_secret)?;
    Ok(Json(claims))
}
