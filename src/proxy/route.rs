use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::HeaderMap,
    routing::{on, MethodRouter},
};
use std::collections::HashMap;

use super::{Endpoint, Inbound};
use crate::app::AppState;
use crate::middleware::SessionContext;

/// Method router that forwards to `endpoint` with no local logic in between
pub fn route(endpoint: &'static Endpoint) -> MethodRouter<AppState> {
    let handler = move |State(state): State<AppState>,
                        session: SessionContext,
                        params: Option<Path<HashMap<String, String>>>,
                        RawQuery(query): RawQuery,
                        headers: HeaderMap,
                        body: Bytes| async move {
        let inbound = Inbound::new(&session, &headers, body)
            .with_params(params.map(|Path(p)| p).unwrap_or_default())
            .with_query(query);

        state.proxy.forward(endpoint, inbound).await
    };

    on(endpoint.verb.filter(), handler)
}
