// Seafarer resources: documents, profile, contracts.

use axum::{http::StatusCode, Router};
use serde_json::{json, Value};
use std::time::Duration;

use crate::app::AppState;
use crate::proxy::{self, BodyTransform, Endpoint};

fn no_documents() -> Value {
    json!({ "documents": [] })
}

fn unknown_status() -> Value {
    json!({ "status": null })
}

fn no_contracts() -> Value {
    json!({ "contracts": [] })
}

pub static DOCUMENTS: Endpoint = Endpoint::get("seafarer.documents", "/seafarer/documents")
    .wrap_in("documents")
    .mask_upstream_errors()
    .fallback(StatusCode::OK, no_documents);

pub static UPLOAD_DOCUMENT: Endpoint = Endpoint::post("seafarer.documents.upload", "/seafarer/documents")
    .body(BodyTransform::Multipart)
    .timeout(Duration::from_secs(60));

pub static DOCUMENT_STATUS: Endpoint = Endpoint::get("seafarer.documents.status", "/documents/{id}/status")
    .mask_upstream_errors()
    .fallback(StatusCode::OK, unknown_status);

pub static PROFILE: Endpoint = Endpoint::get("seafarer.profile", "/seafarer/profile");

pub static UPDATE_PROFILE: Endpoint = Endpoint::put("seafarer.profile.update", "/seafarer/profile");

pub static CONTRACTS: Endpoint = Endpoint::get("seafarer.contracts", "/seafarer/contracts")
    .wrap_in("contracts")
    .fallback(StatusCode::OK, no_contracts);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/seafarer/documents",
            proxy::route(&DOCUMENTS).merge(proxy::route(&UPLOAD_DOCUMENT)),
        )
        .route("/api/seafarer/documents/:id/status", proxy::route(&DOCUMENT_STATUS))
        .route(
            "/api/seafarer/profile",
            proxy::route(&PROFILE).merge(proxy::route(&UPDATE_PROFILE)),
        )
        .route("/api/seafarer/contracts", proxy::route(&CONTRACTS))
}
