use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn imaging_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/studies", post(handlers::upload_study))
        .route("/studies/{study_id}", get(handlers::get_study))
        .route("/studies/{study_id}/send-link", post(handlers::send_study_link))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
