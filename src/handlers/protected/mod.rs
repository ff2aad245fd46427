// handlers/protected/mod.rs - Protected handlers (caller credential required)
//
// Security Level: bearer credential present (cookie or Authorization header)
// Route Prefix: /api/*
//
// Credentials are not checked here beyond presence; the crew service decides
// whether they are valid on every forwarded call.

pub mod admin;
pub mod auth;
pub mod documents;
pub mod seafarer;
pub mod shipowner;

use axum::Router;

use crate::app::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(seafarer::routes())
        .merge(shipowner::routes())
        .merge(admin::routes())
        .merge(documents::routes())
}
