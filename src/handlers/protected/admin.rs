// Administrator resources. Document review itself lives in the crew service;
// these routes only carry the decision over.

use axum::{http::StatusCode, Router};
use serde_json::{json, Value};
use std::time::Duration;

use crate::app::AppState;
use crate::proxy::{self, Endpoint};

fn no_documents() -> Value {
    json!({ "documents": [] })
}

fn empty_stats() -> Value {
    json!({})
}

pub static USERS: Endpoint = Endpoint::get("admin.users", "/admin/users").wrap_in("users");

pub static UPDATE_USER_STATUS: Endpoint = Endpoint::patch("admin.users.status", "/admin/users/{id}/status")
    .require(&["status"]);

pub static PENDING_DOCUMENTS: Endpoint = Endpoint::get("admin.documents.pending", "/admin/documents/pending")
    .wrap_in("documents")
    .mask_upstream_errors()
    .fallback(StatusCode::OK, no_documents);

pub static REVIEW_DOCUMENT: Endpoint = Endpoint::patch("admin.documents.review", "/admin/documents/{id}/review")
    .require(&["status"]);

pub static DASHBOARD: Endpoint = Endpoint::get("admin.dashboard", "/admin/dashboard/stats")
    .timeout(Duration::from_secs(10))
    .fallback(StatusCode::OK, empty_stats);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", proxy::route(&USERS))
        .route("/api/admin/users/:id/status", proxy::route(&UPDATE_USER_STATUS))
        .route("/api/admin/documents/pending", proxy::route(&PENDING_DOCUMENTS))
        .route("/api/admin/documents/:id/review", proxy::route(&REVIEW_DOCUMENT))
        .route("/api/admin/dashboard", proxy::route(&DASHBOARD))
}
