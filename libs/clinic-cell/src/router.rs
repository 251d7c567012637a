use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn clinic_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::create_clinic))
        .route("/", get(handlers::list_clinics))
        .route("/{clinic_id}", get(handlers::get_clinic))
        .route("/{clinic_id}", patch(handlers::update_clinic))
        .route("/{clinic_id}", delete(handlers::delete_clinic))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
