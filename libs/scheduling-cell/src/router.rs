use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn scheduling_routes(state: Arc<AppConfig>) -> Router {
    // Published schedules are patient-facing.
    let public_routes = Router::new().route(
        "/availability/doctors/{doctor_id}",
        get(handlers::get_availability),
    );

    let protected_routes = Router::new()
        .route("/availability", post(handlers::set_my_availability))
        .route("/appointments", post(handlers::create_appointment))
        .route("/appointments", get(handlers::list_appointments))
        .route(
            "/appointments/{appointment_id}/cancel",
            post(handlers::cancel_appointment),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
