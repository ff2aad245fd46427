use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SessionContext;
use crate::proxy::{Endpoint, Inbound};
use crate::storage::sign_download_link;

pub static DOCUMENT: Endpoint = Endpoint::get("documents.detail", "/documents/{id}");

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/documents/:id/download", get(download_link))
}

/// GET /api/documents/:id/download - temporary link to the stored file
///
/// The crew service decides whether the caller may see the document; we only
/// sign a link once it has handed over the metadata.
pub async fn download_link(
    State(state): State<AppState>,
    session: SessionContext,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let inbound = Inbound::new(&session, &headers, Default::default())
        .with_params(HashMap::from([("id".to_string(), id.clone())]));

    let reply = state.proxy.forward(&DOCUMENT, inbound).await?;
    if !reply.is_success() {
        return Ok(reply.into_response());
    }

    let file_key = reply
        .body
        .as_ref()
        .and_then(|doc| doc.get("file_key").or_else(|| doc.get("file_path")))
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ApiError::not_found("Document has no stored file"))?;

    let link = sign_download_link(&state.config.storage, file_key)?;
    tracing::info!("Issued download link for document {} (expires {})", id, link.expires_at);

    Ok(Json(link).into_response())
}
