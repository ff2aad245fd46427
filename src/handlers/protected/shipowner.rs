use axum::{http::StatusCode, Router};
use serde_json::{json, Value};
use std::time::Duration;

use crate::app::AppState;
use crate::proxy::{self, Endpoint};

fn no_vessels() -> Value {
    json!({ "vessels": [] })
}

fn no_crew() -> Value {
    json!({ "crew": [] })
}

fn empty_dashboard() -> Value {
    json!({})
}

pub static VESSELS: Endpoint = Endpoint::get("shipowner.vessels", "/shipowner/vessels")
    .wrap_in("vessels")
    .fallback(StatusCode::OK, no_vessels);

pub static CREW: Endpoint = Endpoint::get("shipowner.crew", "/shipowner/crew")
    .wrap_in("crew")
    .mask_upstream_errors()
    .fallback(StatusCode::OK, no_crew);

pub static CREATE_CONTRACT: Endpoint = Endpoint::post("shipowner.contracts.create", "/shipowner/contracts")
    .require(&["seafarer_id", "vessel_id"]);

pub static DASHBOARD: Endpoint = Endpoint::get("shipowner.dashboard", "/shipowner/dashboard")
    .timeout(Duration::from_secs(10))
    .fallback(StatusCode::OK, empty_dashboard);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/shipowner/vessels", proxy::route(&VESSELS))
        .route("/api/shipowner/crew", proxy::route(&CREW))
        .route("/api/shipowner/contracts", proxy::route(&CREATE_CONTRACT))
        .route("/api/shipowner/dashboard", proxy::route(&DASHBOARD))
}
