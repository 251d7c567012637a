use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use auth_cell::router::auth_routes;
use clinic_cell::router::clinic_routes;
use imaging_cell::router::imaging_routes;
use membership_cell::router::membership_routes;
use scheduling_cell::router::scheduling_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Tessera Clinic API is running!" }))
        .route("/healthz", get(healthz))
        .with_state(state.clone())
        .nest("/auth", auth_routes(state.clone()))
        .nest("/clinics", clinic_routes(state.clone()))
        .nest("/memberships", membership_routes(state.clone()))
        .nest("/pacs", imaging_routes(state.clone()))
        .nest("/scheduling", scheduling_routes(state))
}

async fn healthz(State(config): State<Arc<AppConfig>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "tessera-clinic-api",
        "environment": config.environment,
    }))
}
