// handlers/public/mod.rs - Public handlers (no caller credential required)
//
// Security Level: None
// Route Prefix: /api/auth/*

pub mod auth;

use axum::Router;

use crate::app::AppState;

pub fn routes() -> Router<AppState> {
    auth::routes()
}
