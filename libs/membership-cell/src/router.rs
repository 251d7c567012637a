use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn membership_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/clinics/{clinic_id}", get(handlers::list_clinic_members))
        .route("/me", get(handlers::my_memberships))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
